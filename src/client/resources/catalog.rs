//! Reference data: roles, job titles, permission names, HR policies and leave types.
//! All of them are plain CRUD collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::gateway::ApiClient;
use crate::client::resource::{ListQuery, Resource};
use crate::error::ApiResult;

pub const ROLE_PATH: &str = "/Role";
pub const TITLE_PATH: &str = "/Title";
pub const PERMISSION_PATH: &str = "/Permission";
pub const POLICY_PATH: &str = "/Policy";
pub const LEAVE_TYPE_PATH: &str = "/LeaveType";

fn default_true() -> bool { true }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleForm {
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "type")]
    pub policy_type: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub policy_type: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub days_per_year: Option<u32>,
    #[serde(default = "default_true")]
    pub is_paid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTypeForm {
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub days_per_year: u32,
    pub is_paid: bool,
}

impl ApiClient {
    pub fn roles(&self) -> Resource<'_, RoleRecord> { Resource::new(self, ROLE_PATH) }
    pub fn titles(&self) -> Resource<'_, Title> { Resource::new(self, TITLE_PATH) }
    pub fn permissions(&self) -> Resource<'_, PermissionRecord> { Resource::new(self, PERMISSION_PATH) }
    pub fn policies(&self) -> Resource<'_, Policy> { Resource::new(self, POLICY_PATH) }
    pub fn leave_types(&self) -> Resource<'_, LeaveType> { Resource::new(self, LEAVE_TYPE_PATH) }

    pub async fn get_roles(&self) -> ApiResult<Vec<RoleRecord>> {
        Ok(self.roles().list(ListQuery::default().to_params()).await?.into_items())
    }

    pub async fn get_titles(&self, department_id: Option<i64>) -> ApiResult<Vec<Title>> {
        let params = crate::client::QueryParams::new().opt("departmentId", department_id);
        Ok(self.titles().list(params).await?.into_items())
    }

    pub async fn get_permission_records(&self) -> ApiResult<Vec<PermissionRecord>> {
        Ok(self.permissions().list(ListQuery::default().to_params()).await?.into_items())
    }

    pub async fn get_policies(&self) -> ApiResult<Vec<Policy>> {
        Ok(self.policies().list(ListQuery::default().to_params()).await?.into_items())
    }

    pub async fn get_leave_types(&self) -> ApiResult<Vec<LeaveType>> {
        Ok(self.leave_types().list(ListQuery::default().to_params()).await?.into_items())
    }
}
