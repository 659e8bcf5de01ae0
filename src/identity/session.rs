use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::tprintln;

use super::permissions::{self, Permissions};
use super::storage::SessionStorage;
use super::user::{Role, User};

pub const TOKEN_KEY: &str = "kmt.auth_token";
pub const USER_KEY: &str = "kmt.user";

/// The authenticated identity held by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Single source of truth for who is logged in.
///
/// Cheap to clone; clones share the same storage. Pass one into `ApiClient` and
/// `RouteGuard` instead of reaching for a global.
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self { Self { storage } }

    pub fn in_memory() -> Self { Self::new(Arc::new(super::storage::MemoryStorage::new())) }

    /// Persist token and user together, replacing any previous session.
    pub fn set_auth(&self, token: &str, user: &User) -> ApiResult<()> {
        let user_json = serde_json::to_string(user).map_err(|e| ApiError::storage(format!("serialize user: {}", e)))?;
        self.storage.set_items(&[(TOKEN_KEY, token), (USER_KEY, user_json.as_str())])?;
        debug!(target: "kmt::session", user = %user.email, role = %user.role, "session stored");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(t) => t.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(target: "kmt::session", "token read failed, treating as logged out: {}", e);
                None
            }
        }
    }

    /// Cached user profile. A slot that does not parse is deleted and reported as absent.
    pub fn user(&self) -> Option<User> {
        let raw = match self.storage.get_item(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(target: "kmt::session", "user read failed, treating as logged out: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(u) => Some(u),
            Err(e) => {
                warn!(target: "kmt::session", "corrupted user entry removed: {}", e);
                if let Err(e) = self.storage.remove_item(USER_KEY) {
                    warn!(target: "kmt::session", "failed to remove corrupted user entry: {}", e);
                }
                None
            }
        }
    }

    /// Convenience check only: a token is present. Nothing about its validity is known here.
    pub fn is_authenticated(&self) -> bool { self.token().is_some() }

    /// Removes both slots. Safe to call when nothing is stored.
    pub fn clear_auth(&self) {
        if let Err(e) = self.storage.remove_items(&[TOKEN_KEY, USER_KEY]) {
            warn!(target: "kmt::session", "failed to clear session: {}", e);
        }
        tprintln!("session.clear");
    }

    /// Both halves of the session, or nothing. A token without a user (or the reverse)
    /// is wiped.
    pub fn current(&self) -> Option<Session> {
        match (self.token(), self.user()) {
            (Some(token), Some(user)) => Some(Session { token, user }),
            (None, None) => None,
            (t, u) => {
                warn!(
                    target: "kmt::session",
                    has_token = t.is_some(),
                    has_user = u.is_some(),
                    "half-present session wiped"
                );
                self.clear_auth();
                None
            }
        }
    }

    pub fn has_role(user: Option<&User>, required: &[Role]) -> bool { permissions::has_role(user, required) }

    pub fn get_permissions(user: Option<&User>) -> Permissions { permissions::get_permissions(user) }

    /// Permissions of whoever is currently stored.
    pub fn current_permissions(&self) -> Permissions { permissions::get_permissions(self.user().as_ref()) }
}
