use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::gateway::ApiClient;
use crate::client::query::QueryParams;
use crate::client::resource::{Listing, Resource};
use crate::error::{ApiError, ApiResult};

pub const LEAVE_REQUEST_PATH: &str = "/LeaveRequest";
pub const LEAVE_BALANCE_PATH: &str = "/LeaveBalance";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Approved")]
    Approved,
    #[serde(alias = "Rejected")]
    Rejected,
    #[serde(alias = "Cancelled", alias = "Canceled")]
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for LeaveStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            "cancelled" | "canceled" => Ok(LeaveStatus::Cancelled),
            other => Err(ApiError::Validation(format!("unknown leave status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    pub leave_type_id: i64,
    #[serde(default)]
    pub leave_type_name: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, alias = "numberOfDays")]
    pub days: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: LeaveStatus,
    #[serde(default)]
    pub reviewer_comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    pub status: Option<LeaveStatus>,
    pub user_id: Option<i64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl LeaveFilter {
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .opt("status", self.status.map(|s| s.as_str()))
            .opt("userId", self.user_id)
            .opt("page", self.page)
            .opt("pageSize", self.page_size)
    }
}

/// What the leave request form collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveForm {
    pub leave_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub half_day: Option<bool>,
}

/// Exact body of `POST /LeaveRequest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequestDto {
    pub leave_type_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub number_of_days: f64,
    pub reason: String,
    pub is_half_day: bool,
}

impl LeaveForm {
    pub fn to_dto(&self) -> ApiResult<CreateLeaveRequestDto> {
        if self.end_date < self.start_date {
            return Err(ApiError::Validation("leave ends before it starts".into()));
        }
        let half_day = self.half_day.unwrap_or(false);
        if half_day && self.end_date != self.start_date {
            return Err(ApiError::Validation("a half-day leave must start and end on the same day".into()));
        }
        let days = if half_day { 0.5 } else { ((self.end_date - self.start_date).num_days() + 1) as f64 };
        Ok(CreateLeaveRequestDto {
            leave_type_id: self.leave_type_id,
            start_date: self.start_date.format("%Y-%m-%d").to_string(),
            end_date: self.end_date.format("%Y-%m-%d").to_string(),
            number_of_days: days,
            reason: self.reason.clone().unwrap_or_default(),
            is_half_day: half_day,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ReviewDto<'a> {
    comment: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub leave_type_id: i64,
    #[serde(default)]
    pub leave_type_name: Option<String>,
    pub total_days: f64,
    pub used_days: f64,
    #[serde(default)]
    pub remaining_days: Option<f64>,
}

impl LeaveBalance {
    pub fn remaining(&self) -> f64 { self.remaining_days.unwrap_or(self.total_days - self.used_days) }
}

impl ApiClient {
    pub fn leave_requests(&self) -> Resource<'_, LeaveRequest> { Resource::new(self, LEAVE_REQUEST_PATH) }

    pub async fn list_leave_requests(&self, filter: &LeaveFilter) -> ApiResult<Listing<LeaveRequest>> {
        self.leave_requests().list(filter.to_params()).await
    }

    pub async fn get_leave_request(&self, id: i64) -> ApiResult<LeaveRequest> { self.leave_requests().get(id).await }

    pub async fn create_leave_request(&self, form: &LeaveForm) -> ApiResult<LeaveRequest> {
        self.leave_requests().create(&form.to_dto()?).await
    }

    pub async fn delete_leave_request(&self, id: i64) -> ApiResult<()> { self.leave_requests().delete(id).await }

    /// `POST /LeaveRequest/{id}/Approve`
    pub async fn approve_leave(&self, id: i64, comment: Option<&str>) -> ApiResult<()> {
        let path = format!("{}/{}/Approve", LEAVE_REQUEST_PATH, id);
        self.post_action(&path, &ReviewDto { comment: comment.unwrap_or("") }).await.map(|_| ())
    }

    /// `POST /LeaveRequest/{id}/Reject`
    pub async fn reject_leave(&self, id: i64, comment: Option<&str>) -> ApiResult<()> {
        let path = format!("{}/{}/Reject", LEAVE_REQUEST_PATH, id);
        self.post_action(&path, &ReviewDto { comment: comment.unwrap_or("") }).await.map(|_| ())
    }

    /// `GET /LeaveBalance/user/{id}`
    pub async fn leave_balances(&self, user_id: i64) -> ApiResult<Vec<LeaveBalance>> {
        self.get(&format!("{}/user/{}", LEAVE_BALANCE_PATH, user_id), QueryParams::new()).await
    }
}
