use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::client::gateway::ApiClient;
use crate::client::query::QueryParams;
use crate::client::resource::{Listing, Resource};
use crate::error::{ApiError, ApiResult};
use crate::identity::{Role, User};

pub const USER_PATH: &str = "/User";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: Option<String>,
    pub department_id: Option<i64>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl UserFilter {
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .opt("search", self.search.as_deref())
            .opt("departmentId", self.department_id)
            .opt("role", self.role.map(|r| r.as_str()))
            .opt("isActive", self.is_active)
            .opt("page", self.page)
            .opt("pageSize", self.page_size)
    }
}

/// Shape the employee editor produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<i64>,
    pub title_id: Option<i64>,
    pub role: Option<Role>,
    pub salary: Option<f64>,
    pub hire_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Exact body the backend's `POST /User` expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub department_id: Option<i64>,
    pub title_id: Option<i64>,
    pub role: Role,
    pub base_salary: f64,
    pub hire_date: String,
    pub is_active: bool,
}

/// Body for `PUT /User/{id}`; the password is changed through its own endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub department_id: Option<i64>,
    pub title_id: Option<i64>,
    pub role: Role,
    pub base_salary: f64,
    pub hire_date: String,
    pub is_active: bool,
}

fn date_or_today(d: Option<NaiveDate>) -> String {
    d.unwrap_or_else(|| Utc::now().date_naive()).format("%Y-%m-%d").to_string()
}

impl EmployeeForm {
    fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("employee name is required".into()));
        }
        if !self.email.contains('@') {
            return Err(ApiError::Validation(format!("invalid email '{}'", self.email)));
        }
        if matches!(self.salary, Some(s) if s < 0.0) {
            return Err(ApiError::Validation("salary cannot be negative".into()));
        }
        Ok(())
    }

    pub fn to_create_dto(&self) -> ApiResult<CreateUserDto> {
        self.validate()?;
        let password = self.password.clone().filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Validation("a password is required for new employees".into()))?;
        Ok(CreateUserDto {
            full_name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password,
            phone_number: self.phone.clone().unwrap_or_default(),
            department_id: self.department_id,
            title_id: self.title_id,
            role: self.role.unwrap_or_default(),
            base_salary: self.salary.unwrap_or(0.0),
            hire_date: date_or_today(self.hire_date),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    pub fn to_update_dto(&self) -> ApiResult<UpdateUserDto> {
        self.validate()?;
        Ok(UpdateUserDto {
            full_name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone.clone().unwrap_or_default(),
            department_id: self.department_id,
            title_id: self.title_id,
            role: self.role.unwrap_or_default(),
            base_salary: self.salary.unwrap_or(0.0),
            hire_date: date_or_today(self.hire_date),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignRolesDto<'a> {
    role_ids: &'a [i64],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordDto<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

impl ApiClient {
    pub fn users(&self) -> Resource<'_, User> { Resource::new(self, USER_PATH) }

    pub async fn list_users(&self, filter: &UserFilter) -> ApiResult<Listing<User>> { self.users().list(filter.to_params()).await }

    pub async fn get_user(&self, id: i64) -> ApiResult<User> { self.users().get(id).await }

    pub async fn create_user(&self, form: &EmployeeForm) -> ApiResult<User> { self.users().create(&form.to_create_dto()?).await }

    pub async fn update_user(&self, id: i64, form: &EmployeeForm) -> ApiResult<User> {
        self.users().update(id, &form.to_update_dto()?).await
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<()> { self.users().delete(id).await }

    /// `PUT /User/{id}/Roles`
    pub async fn assign_user_roles(&self, id: i64, role_ids: &[i64]) -> ApiResult<()> {
        self.put_action(&format!("{}/{}/Roles", USER_PATH, id), &AssignRolesDto { role_ids }).await.map(|_| ())
    }

    /// `PUT /User/{id}/Password`
    pub async fn change_user_password(&self, id: i64, current: &str, new: &str) -> ApiResult<()> {
        if new.len() < 6 {
            return Err(ApiError::Validation("new password must be at least 6 characters".into()));
        }
        let dto = ChangePasswordDto { current_password: current, new_password: new };
        self.put_action(&format!("{}/{}/Password", USER_PATH, id), &dto).await.map(|_| ())
    }
}
