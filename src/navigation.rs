//! Seam between the core and whatever renders views.
//! The gateway and the route guard only ever ask "where am I" and "go there".

use parking_lot::RwLock;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    pub login: String,
    pub unauthorized: String,
}

impl Default for RoutePaths {
    fn default() -> Self { Self { login: LOGIN_PATH.to_string(), unauthorized: UNAUTHORIZED_PATH.to_string() } }
}

/// In-process navigator that records every transition. Used by the CLI and by tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    current: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: &str) -> Self {
        Self { current: RwLock::new(start.to_string()), history: RwLock::new(Vec::new()) }
    }

    /// Paths navigated to, oldest first. The starting path is not included.
    pub fn history(&self) -> Vec<String> { self.history.read().clone() }
}

impl Default for MemoryNavigator {
    fn default() -> Self { Self::new("/") }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String { self.current.read().clone() }

    fn navigate(&self, path: &str) {
        *self.current.write() = path.to_string();
        self.history.write().push(path.to_string());
    }
}
