use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::gateway::ApiClient;
use crate::client::query::QueryParams;
use crate::client::resource::{Listing, Resource};
use crate::error::{ApiError, ApiResult};

pub const ATTENDANCE_PATH: &str = "/Attendance";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    pub date: String,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub user_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl AttendanceFilter {
    pub fn to_params(&self) -> ApiResult<QueryParams> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(ApiError::Validation(format!("date range ends ({}) before it starts ({})", to, from)));
            }
        }
        Ok(QueryParams::new()
            .opt("userId", self.user_id)
            .opt("startDate", self.from.map(|d| d.format("%Y-%m-%d")))
            .opt("endDate", self.to.map(|d| d.format("%Y-%m-%d")))
            .opt("status", self.status.as_deref())
            .opt("page", self.page)
            .opt("pageSize", self.page_size))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

impl ApiClient {
    pub fn attendance(&self) -> Resource<'_, AttendanceRecord> { Resource::new(self, ATTENDANCE_PATH) }

    pub async fn list_attendance(&self, filter: &AttendanceFilter) -> ApiResult<Listing<AttendanceRecord>> {
        self.attendance().list(filter.to_params()?).await
    }

    pub async fn get_attendance(&self, id: i64) -> ApiResult<AttendanceRecord> { self.attendance().get(id).await }

    /// `POST /Attendance/check-in`
    pub async fn check_in(&self, req: &CheckInRequest) -> ApiResult<AttendanceRecord> {
        self.post(&format!("{}/check-in", ATTENDANCE_PATH), req).await
    }

    /// `POST /Attendance/check-out`
    pub async fn check_out(&self, req: &CheckInRequest) -> ApiResult<AttendanceRecord> {
        self.post(&format!("{}/check-out", ATTENDANCE_PATH), req).await
    }
}
