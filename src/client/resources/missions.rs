use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::gateway::ApiClient;
use crate::client::query::QueryParams;
use crate::client::resource::{ListQuery, Listing, Resource};
use crate::error::{ApiError, ApiResult};

pub const MISSION_PATH: &str = "/Mission";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionForm {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDto {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
}

impl MissionForm {
    pub fn to_dto(&self) -> ApiResult<MissionDto> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("mission title is required".into()));
        }
        if self.end_date < self.start_date {
            return Err(ApiError::Validation("mission ends before it starts".into()));
        }
        Ok(MissionDto {
            title: self.title.trim().to_string(),
            description: self.description.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            start_date: self.start_date.format("%Y-%m-%d").to_string(),
            end_date: self.end_date.format("%Y-%m-%d").to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionAssignment {
    #[serde(default)]
    pub id: Option<i64>,
    pub mission_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignDto<'a> {
    user_ids: &'a [i64],
}

impl ApiClient {
    pub fn missions(&self) -> Resource<'_, Mission> { Resource::new(self, MISSION_PATH) }

    pub async fn list_missions(&self, query: &ListQuery) -> ApiResult<Listing<Mission>> { self.missions().list(query.to_params()).await }

    pub async fn get_mission(&self, id: i64) -> ApiResult<Mission> { self.missions().get(id).await }

    pub async fn create_mission(&self, form: &MissionForm) -> ApiResult<Mission> { self.missions().create(&form.to_dto()?).await }

    pub async fn update_mission(&self, id: i64, form: &MissionForm) -> ApiResult<Mission> {
        self.missions().update(id, &form.to_dto()?).await
    }

    pub async fn delete_mission(&self, id: i64) -> ApiResult<()> { self.missions().delete(id).await }

    /// `GET /Mission/{id}/assignments`
    pub async fn mission_assignments(&self, id: i64) -> ApiResult<Vec<MissionAssignment>> {
        self.get(&format!("{}/{}/assignments", MISSION_PATH, id), QueryParams::new()).await
    }

    /// `POST /Mission/{id}/assignments`
    pub async fn assign_mission(&self, id: i64, user_ids: &[i64]) -> ApiResult<()> {
        if user_ids.is_empty() {
            return Err(ApiError::Validation("no users to assign".into()));
        }
        self.post_action(&format!("{}/{}/assignments", MISSION_PATH, id), &AssignDto { user_ids }).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_defaults_optional_text() {
        let f = MissionForm {
            title: "Site survey".into(),
            description: None,
            location: Some("Riyadh".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
        };
        let v = serde_json::to_value(f.to_dto().unwrap()).unwrap();
        assert_eq!(v["description"], "");
        assert_eq!(v["location"], "Riyadh");
        assert_eq!(v["endDate"], "2024-09-03");
    }
}
