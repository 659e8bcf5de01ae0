use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::client::resources::leave::CreateLeaveRequestDto;
use crate::client::resources::users::{CreateUserDto, UpdateUserDto};
use crate::client::{Department, DepartmentForm, LeaveRequest, LeaveStatus};
use crate::identity::{permissions_for, Capability, User};

use super::state::{Account, MockState};

type Reply = Result<Response, Response>;

/// `{data, message, success}` wrapper, the shape most of the real backend's controllers use.
fn envelope(status: StatusCode, data: Value, message: &str) -> Response {
    (status, Json(json!({ "data": data, "message": message, "success": true }))).into_response()
}

fn bare(status: StatusCode, data: Value) -> Response { (status, Json(data)).into_response() }

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message, "success": false }))).into_response()
}

fn to_json<T: serde::Serialize>(v: &T) -> Result<Value, Response> {
    serde_json::to_value(v).map_err(|e| fail(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn caller(state: &MockState, headers: &HeaderMap) -> Result<User, Response> {
    let db = state.db.read().await;
    match bearer(headers).and_then(|t| db.user_by_token(t)) {
        Some(u) => Ok(u.clone()),
        None => {
            debug!(target: "kmt::mock", "rejecting request without a valid bearer token");
            Err(fail(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

fn require(user: &User, cap: Capability) -> Result<(), Response> {
    if permissions_for(user.role).can(cap) {
        Ok(())
    } else {
        Err(fail(StatusCode::FORBIDDEN, &format!("{} is not allowed for role {}", cap.flag_name(), user.role)))
    }
}

fn new_token() -> Result<String, Response> {
    let mut bytes = [0u8; 24];
    getrandom::getrandom(&mut bytes).map_err(|e| fail(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;
    let mut token = String::with_capacity(48);
    use std::fmt::Write as _;
    for b in &bytes {
        let _ = write!(&mut token, "{:02x}", b);
    }
    Ok(token)
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn login(State(state): State<MockState>, Json(payload): Json<LoginPayload>) -> Reply {
    let mut db = state.db.write().await;
    let account = db
        .accounts
        .iter()
        .find(|a| a.user.email.eq_ignore_ascii_case(payload.email.trim()) && a.password == payload.password)
        .map(|a| a.user.clone());
    let Some(user) = account else {
        warn!(target: "kmt::mock", email = %payload.email, "login rejected");
        return Err(fail(StatusCode::UNAUTHORIZED, "Invalid email or password"));
    };
    if !user.is_active {
        return Err(fail(StatusCode::FORBIDDEN, "Account is disabled"));
    }
    let token = new_token()?;
    db.tokens.insert(token.clone(), user.id);
    info!(target: "kmt::mock", email = %user.email, "login");
    Ok(envelope(StatusCode::OK, json!({ "token": token, "user": to_json(&user)? }), "Login successful"))
}

pub async fn logout(State(state): State<MockState>, headers: HeaderMap) -> Reply {
    if let Some(token) = bearer(&headers) {
        state.db.write().await.tokens.remove(token);
    }
    Ok(bare(StatusCode::OK, json!({ "success": true, "message": "Logged out" })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    search: Option<String>,
    department_id: Option<i64>,
    page: Option<u32>,
    page_size: Option<u32>,
}

fn matches_search(haystacks: &[&str], needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        None => true,
        Some(n) => {
            let n = n.to_lowercase();
            haystacks.iter().any(|h| h.to_lowercase().contains(&n))
        }
    }
}

const MAX_PAGE_SIZE: u32 = 100;

/// Paged and enveloped.
pub async fn list_users(State(state): State<MockState>, headers: HeaderMap, Query(q): Query<UserQuery>) -> Reply {
    caller(&state, &headers).await?;
    let db = state.db.read().await;
    let matched: Vec<&User> = db
        .accounts
        .iter()
        .map(|a| &a.user)
        .filter(|u| matches_search(&[u.name.as_str(), u.email.as_str()], q.search.as_deref()))
        .filter(|u| q.department_id.is_none() || u.department_id == q.department_id)
        .collect();
    let page = q.page.unwrap_or(1).max(1);
    let page_size = q.page_size.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);
    let offset = (page as usize - 1).saturating_mul(page_size as usize);
    let items: Vec<&User> = matched.iter().copied().skip(offset).take(page_size as usize).collect();
    let data = json!({
        "items": to_json(&items)?,
        "totalCount": matched.len(),
        "page": page,
        "pageSize": page_size,
    });
    Ok(envelope(StatusCode::OK, data, "Users retrieved"))
}

pub async fn get_user(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    caller(&state, &headers).await?;
    let db = state.db.read().await;
    let user = db.user(id).ok_or_else(|| fail(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(bare(StatusCode::OK, to_json(user)?))
}

pub async fn create_user(State(state): State<MockState>, headers: HeaderMap, Json(dto): Json<CreateUserDto>) -> Reply {
    let who = caller(&state, &headers).await?;
    require(&who, Capability::ManageEmployees)?;
    let mut db = state.db.write().await;
    if db.accounts.iter().any(|a| a.user.email.eq_ignore_ascii_case(&dto.email)) {
        return Err(fail(StatusCode::CONFLICT, "Email already in use"));
    }
    let id = db.next_id();
    let user = User {
        id,
        name: dto.full_name,
        email: dto.email,
        role: dto.role,
        department_id: dto.department_id,
        is_active: dto.is_active,
        created_at: Utc::now(),
    };
    db.accounts.push(Account { user: user.clone(), password: dto.password });
    Ok(envelope(StatusCode::CREATED, to_json(&user)?, "User created"))
}

pub async fn update_user(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateUserDto>,
) -> Reply {
    let who = caller(&state, &headers).await?;
    require(&who, Capability::ManageEmployees)?;
    let mut db = state.db.write().await;
    let account = db.accounts.iter_mut().find(|a| a.user.id == id).ok_or_else(|| fail(StatusCode::NOT_FOUND, "User not found"))?;
    account.user.name = dto.full_name;
    account.user.email = dto.email;
    account.user.role = dto.role;
    account.user.department_id = dto.department_id;
    account.user.is_active = dto.is_active;
    Ok(bare(StatusCode::OK, to_json(&account.user)?))
}

pub async fn delete_user(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let who = caller(&state, &headers).await?;
    require(&who, Capability::ManageEmployees)?;
    let mut db = state.db.write().await;
    let before = db.accounts.len();
    db.accounts.retain(|a| a.user.id != id);
    if db.accounts.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "User not found"));
    }
    db.tokens.retain(|_, uid| *uid != id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    search: Option<String>,
}

/// Bare array.
pub async fn list_departments(State(state): State<MockState>, headers: HeaderMap, Query(q): Query<SearchQuery>) -> Reply {
    caller(&state, &headers).await?;
    let db = state.db.read().await;
    let items: Vec<Department> = db
        .departments_view()
        .into_iter()
        .filter(|d| matches_search(&[d.name.as_str(), d.name_ar.as_deref().unwrap_or("")], q.search.as_deref()))
        .collect();
    Ok(bare(StatusCode::OK, to_json(&items)?))
}

pub async fn get_department(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    caller(&state, &headers).await?;
    let db = state.db.read().await;
    let dept = db.departments_view().into_iter().find(|d| d.id == id).ok_or_else(|| fail(StatusCode::NOT_FOUND, "Department not found"))?;
    Ok(bare(StatusCode::OK, to_json(&dept)?))
}

fn apply_form(dept: &mut Department, form: DepartmentForm) {
    let opt = |s: String| if s.trim().is_empty() { None } else { Some(s) };
    dept.name = form.name.trim().to_string();
    dept.name_ar = opt(form.name_ar);
    dept.description = opt(form.description);
    dept.description_ar = opt(form.description_ar);
    dept.manager_id = form.manager_id;
}

pub async fn create_department(State(state): State<MockState>, headers: HeaderMap, Json(form): Json<DepartmentForm>) -> Reply {
    let who = caller(&state, &headers).await?;
    require(&who, Capability::ManageDepartments)?;
    if form.name.trim().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Name is required"));
    }
    let mut db = state.db.write().await;
    let mut dept = Department {
        id: db.next_id(),
        name: String::new(),
        name_ar: None,
        description: None,
        description_ar: None,
        manager_id: None,
        employee_count: Some(0),
        created_at: Some(Utc::now()),
    };
    apply_form(&mut dept, form);
    db.departments.push(dept.clone());
    Ok(envelope(StatusCode::CREATED, to_json(&dept)?, "Department created"))
}

pub async fn update_department(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(form): Json<DepartmentForm>,
) -> Reply {
    let who = caller(&state, &headers).await?;
    require(&who, Capability::ManageDepartments)?;
    let mut db = state.db.write().await;
    let dept = db.departments.iter_mut().find(|d| d.id == id).ok_or_else(|| fail(StatusCode::NOT_FOUND, "Department not found"))?;
    apply_form(dept, form);
    Ok(envelope(StatusCode::OK, to_json(&*dept)?, "Department updated"))
}

pub async fn delete_department(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let who = caller(&state, &headers).await?;
    require(&who, Capability::ManageDepartments)?;
    let mut db = state.db.write().await;
    let before = db.departments.len();
    db.departments.retain(|d| d.id != id);
    if db.departments.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "Department not found"));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveQuery {
    status: Option<String>,
    user_id: Option<i64>,
}

/// Approvers see every request, everybody else only their own.
pub async fn list_leave_requests(State(state): State<MockState>, headers: HeaderMap, Query(q): Query<LeaveQuery>) -> Reply {
    let who = caller(&state, &headers).await?;
    let status = match q.status.as_deref() {
        Some(s) => Some(s.parse::<LeaveStatus>().map_err(|e| fail(StatusCode::BAD_REQUEST, &e.to_string()))?),
        None => None,
    };
    let sees_all = permissions_for(who.role).can(Capability::ApproveLeave);
    let db = state.db.read().await;
    let items: Vec<&LeaveRequest> = db
        .leave_requests
        .iter()
        .filter(|r| sees_all || r.user_id == who.id)
        .filter(|r| status.map_or(true, |s| r.status == s))
        .filter(|r| q.user_id.map_or(true, |u| r.user_id == u))
        .collect();
    Ok(envelope(StatusCode::OK, to_json(&items)?, "Leave requests retrieved"))
}

pub async fn create_leave_request(State(state): State<MockState>, headers: HeaderMap, Json(dto): Json<CreateLeaveRequestDto>) -> Reply {
    let who = caller(&state, &headers).await?;
    if dto.end_date < dto.start_date {
        return Err(fail(StatusCode::BAD_REQUEST, "End date must not precede start date"));
    }
    let mut db = state.db.write().await;
    let req = LeaveRequest {
        id: db.next_id(),
        user_id: who.id,
        user_name: Some(who.name.clone()),
        leave_type_id: dto.leave_type_id,
        leave_type_name: None,
        start_date: dto.start_date,
        end_date: dto.end_date,
        days: Some(dto.number_of_days),
        reason: Some(dto.reason).filter(|r| !r.is_empty()),
        status: LeaveStatus::Pending,
        reviewer_comment: None,
    };
    db.leave_requests.push(req.clone());
    Ok(envelope(StatusCode::CREATED, to_json(&req)?, "Leave request submitted"))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewPayload {
    #[serde(default)]
    comment: Option<String>,
}

async fn review(state: MockState, headers: HeaderMap, id: i64, comment: Option<String>, outcome: LeaveStatus) -> Reply {
    let who = caller(&state, &headers).await?;
    require(&who, Capability::ApproveLeave)?;
    let mut db = state.db.write().await;
    let req = db.leave_requests.iter_mut().find(|r| r.id == id).ok_or_else(|| fail(StatusCode::NOT_FOUND, "Leave request not found"))?;
    if req.status != LeaveStatus::Pending {
        return Err(fail(StatusCode::BAD_REQUEST, &format!("Leave request is already {}", req.status.as_str())));
    }
    req.status = outcome;
    req.reviewer_comment = comment.filter(|c| !c.trim().is_empty());
    info!(target: "kmt::mock", id, status = outcome.as_str(), reviewer = %who.email, "leave reviewed");
    Ok(envelope(StatusCode::OK, to_json(&*req)?, &format!("Leave request {}", outcome.as_str())))
}

pub async fn approve_leave(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<i64>, Json(p): Json<ReviewPayload>) -> Reply {
    review(state, headers, id, p.comment, LeaveStatus::Approved).await
}

pub async fn reject_leave(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<i64>, Json(p): Json<ReviewPayload>) -> Reply {
    review(state, headers, id, p.comment, LeaveStatus::Rejected).await
}

/// Bare array.
pub async fn list_missions(State(state): State<MockState>, headers: HeaderMap) -> Reply {
    caller(&state, &headers).await?;
    let db = state.db.read().await;
    Ok(bare(StatusCode::OK, to_json(&db.missions)?))
}
