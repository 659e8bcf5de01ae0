use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::gateway::ApiClient;
use crate::client::resource::{ListQuery, Listing, Resource};
use crate::error::{ApiError, ApiResult};

pub const DEPARTMENT_PATH: &str = "/Department";

/// Departments carry English and Arabic names and descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_ar: Option<String>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub employee_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentForm {
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

impl DepartmentForm {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), ..Default::default() } }

    fn validated(&self) -> ApiResult<&Self> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("department name is required".into()));
        }
        Ok(self)
    }
}

impl ApiClient {
    pub fn departments(&self) -> Resource<'_, Department> { Resource::new(self, DEPARTMENT_PATH) }

    pub async fn get_departments(&self, query: &ListQuery) -> ApiResult<Vec<Department>> {
        Ok(self.departments().list(query.to_params()).await?.into_items())
    }

    pub async fn list_departments(&self, query: &ListQuery) -> ApiResult<Listing<Department>> {
        self.departments().list(query.to_params()).await
    }

    pub async fn get_department(&self, id: i64) -> ApiResult<Department> { self.departments().get(id).await }

    pub async fn create_department(&self, form: &DepartmentForm) -> ApiResult<Department> {
        self.departments().create(form.validated()?).await
    }

    pub async fn update_department(&self, id: i64, form: &DepartmentForm) -> ApiResult<Department> {
        self.departments().update(id, form.validated()?).await
    }

    pub async fn delete_department(&self, id: i64) -> ApiResult<()> { self.departments().delete(id).await }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_wire_shape() {
        let f = DepartmentForm {
            name: "Eng".into(),
            name_ar: "مهندسة".into(),
            description: "builds things".into(),
            description_ar: "...".into(),
            manager_id: None,
        };
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["nameAr"], "مهندسة");
        assert_eq!(v["descriptionAr"], "...");
        assert!(v.get("managerId").is_none());
        assert!(DepartmentForm::new("  ").validated().is_err());
    }

    #[test]
    fn department_tolerates_missing_optionals() {
        let d: Department = serde_json::from_str(r#"{"id":1,"name":"HR"}"#).unwrap();
        assert_eq!(d.name_ar, None);
        assert_eq!(d.employee_count, None);
    }
}
