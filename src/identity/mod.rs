//! Client-side identity: who is logged in, what their role allows, and whether a view
//! may render. Keep the public surface thin and split implementation across sub-modules.

mod user;
mod permissions;
mod storage;
mod session;
mod guard;

pub use user::{Role, User};
pub use permissions::{Capability, Permissions, permissions_for, get_permissions, has_role};
pub use storage::{SessionStorage, FileStorage, MemoryStorage};
pub use session::{Session, SessionStore, TOKEN_KEY, USER_KEY};
pub use guard::{RouteGuard, GuardDecision};
