use tracing::debug;

use crate::navigation::{Navigator, RoutePaths};

use super::session::{Session, SessionStore};
use super::user::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(Session),
    RedirectToLogin,
    Deny { role: Role },
}

/// Gate for an authenticated view, optionally restricted to a set of roles.
/// An empty role set admits any logged-in user.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    required_roles: Vec<Role>,
}

impl RouteGuard {
    pub fn authenticated() -> Self { Self::default() }

    pub fn with_roles(roles: &[Role]) -> Self { Self { required_roles: roles.to_vec() } }

    pub fn required_roles(&self) -> &[Role] { &self.required_roles }

    pub fn check(&self, store: &SessionStore) -> GuardDecision {
        let Some(session) = store.current() else { return GuardDecision::RedirectToLogin; };
        if !self.required_roles.is_empty() && !SessionStore::has_role(Some(&session.user), &self.required_roles) {
            return GuardDecision::Deny { role: session.user.role };
        }
        GuardDecision::Allow(session)
    }

    /// Apply the decision: the session on success, otherwise navigate away and return `None`.
    pub fn enforce(&self, store: &SessionStore, nav: &dyn Navigator, paths: &RoutePaths) -> Option<Session> {
        match self.check(store) {
            GuardDecision::Allow(s) => Some(s),
            GuardDecision::RedirectToLogin => {
                if nav.current_path() != paths.login {
                    nav.navigate(&paths.login);
                }
                None
            }
            GuardDecision::Deny { role } => {
                debug!(target: "kmt::session", %role, required = ?self.required_roles, "route denied");
                nav.navigate(&paths.unauthorized);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::User;
    use crate::navigation::MemoryNavigator;

    fn logged_in(role: Role) -> SessionStore {
        let store = SessionStore::in_memory();
        let mut u = User::from_login_email("who@kmt.io");
        u.role = role;
        store.set_auth("t", &u).unwrap();
        store
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        let store = SessionStore::in_memory();
        assert_eq!(RouteGuard::authenticated().check(&store), GuardDecision::RedirectToLogin);

        let nav = MemoryNavigator::new("/payroll");
        assert!(RouteGuard::authenticated().enforce(&store, &nav, &RoutePaths::default()).is_none());
        assert_eq!(nav.current_path(), "/login");
    }

    #[test]
    fn role_gate() {
        let store = logged_in(Role::TeamLeader);
        let guard = RouteGuard::with_roles(&[Role::GeneralManager, Role::HrManager]);
        assert_eq!(guard.check(&store), GuardDecision::Deny { role: Role::TeamLeader });

        let nav = MemoryNavigator::new("/payroll");
        assert!(guard.enforce(&store, &nav, &RoutePaths::default()).is_none());
        assert_eq!(nav.history(), vec!["/unauthorized".to_string()]);

        let store = logged_in(Role::HrManager);
        assert!(matches!(guard.check(&store), GuardDecision::Allow(_)));
    }

    #[test]
    fn no_required_roles_admits_any_user() {
        let store = logged_in(Role::Default);
        let nav = MemoryNavigator::new("/");
        let s = RouteGuard::authenticated().enforce(&store, &nav, &RoutePaths::default());
        assert_eq!(s.map(|s| s.user.email), Some("who@kmt.io".to_string()));
        assert!(nav.history().is_empty());
    }
}
