use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::client::gateway::{ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};
use crate::identity::{Session, User};

pub const LOGIN_ENDPOINT: &str = "/Auth/login";
pub const LOGOUT_ENDPOINT: &str = "/Auth/logout";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login answers come in several shapes; all of them land here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default, alias = "accessToken", alias = "access_token", alias = "jwt")]
    pub token: Option<String>,
    /// Kept loose: the profile is best effort and must not sink a valid token.
    #[serde(default)]
    pub user: Option<Value>,
}

/// Profile from a login answer. An id the client cannot represent (a GUID string, say)
/// is dropped; anything else unreadable falls back to the email-derived profile.
fn profile_from(value: Value, email: &str) -> User {
    let err = match serde_json::from_value::<User>(value.clone()) {
        Ok(u) => return u,
        Err(e) => e,
    };
    if let Value::Object(mut map) = value {
        if map.remove("id").is_some() {
            if let Ok(u) = serde_json::from_value::<User>(Value::Object(map)) {
                warn!(target: "kmt::client", "login profile id is not numeric, keeping the rest of the profile");
                return u;
            }
        }
    }
    warn!(target: "kmt::client", "unreadable login profile ({}), using one derived from the email", err);
    User::from_login_email(email)
}

impl LoginResponse {
    /// Token plus a profile; a missing profile is synthesized from the login email.
    pub fn into_session(self, email: &str) -> ApiResult<Session> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::decode(LOGIN_ENDPOINT, "login response carried no token"))?;
        let user = match self.user.filter(|v| !v.is_null()) {
            Some(v) => {
                let mut u = profile_from(v, email);
                if u.email.is_empty() {
                    u.email = email.to_string();
                }
                u
            }
            None => User::from_login_email(email),
        };
        Ok(Session { token, user })
    }
}

impl ApiClient {
    /// `POST /Auth/login`, then persist the session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation("email and password are required".into()));
        }
        let resp: LoginResponse = self.post(LOGIN_ENDPOINT, &LoginRequest { email, password }).await?;
        let session = resp.into_session(email)?;
        self.session().set_auth(&session.token, &session.user)?;
        info!(target: "kmt::client", user = %session.user.email, role = %session.user.role, "logged in");
        Ok(session)
    }

    /// `POST /Auth/logout`, best effort. The local session is cleared whatever the
    /// backend says.
    pub async fn logout(&self) {
        if let Err(e) = self.send(ApiRequest::post(LOGOUT_ENDPOINT)).await {
            warn!(target: "kmt::client", "logout call failed, clearing local session anyway: {}", e);
        }
        self.session().clear_auth();
    }
}
