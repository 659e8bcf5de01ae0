use std::sync::Arc;

use tracing::info;

use crate::identity::SessionStore;
use crate::navigation::Navigator;

/// Runs after the gateway has classified a response as 401 and before the error is
/// returned to the caller.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self, session: &SessionStore);
}

impl<F> UnauthorizedHandler for F
where
    F: Fn(&SessionStore) + Send + Sync,
{
    fn on_unauthorized(&self, session: &SessionStore) { self(session) }
}

/// Default 401 policy: wipe the session and send the user to the login view, unless
/// that view is already showing.
pub struct SessionTeardown {
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl SessionTeardown {
    pub fn new(navigator: Arc<dyn Navigator>, login_path: impl Into<String>) -> Self {
        Self { navigator, login_path: login_path.into() }
    }
}

impl UnauthorizedHandler for SessionTeardown {
    fn on_unauthorized(&self, session: &SessionStore) {
        session.clear_auth();
        if self.navigator.current_path() != self.login_path {
            info!(target: "kmt::client", to = %self.login_path, "session rejected by backend, redirecting");
            self.navigator.navigate(&self.login_path);
        }
    }
}
