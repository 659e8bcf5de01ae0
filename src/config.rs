//! Client configuration.
//! The backend base URL has a fixed default and can be overridden per process through
//! `KMT_API_BASE_URL`.

use std::path::PathBuf;

use reqwest::Url;

use crate::error::{ApiError, ApiResult};
use crate::navigation::RoutePaths;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const BASE_URL_ENV: &str = "KMT_API_BASE_URL";
pub const SESSION_FILE_ENV: &str = "KMT_SESSION_FILE";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_path: PathBuf,
    pub paths: RoutePaths,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), session_path: default_session_path(), paths: RoutePaths::default() }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self { Self { base_url: base_url.into(), ..Default::default() } }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var(BASE_URL_ENV) {
            if !v.trim().is_empty() { cfg.base_url = v.trim().to_string(); }
        }
        if let Ok(v) = std::env::var(SESSION_FILE_ENV) {
            if !v.trim().is_empty() { cfg.session_path = PathBuf::from(v.trim()); }
        }
        cfg
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    /// Parsed base URL; must be absolute http(s).
    pub fn parsed_base(&self) -> ApiResult<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| ApiError::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::Config(format!("unsupported scheme '{}' in base URL", other))),
        }
    }
}

/// `<config dir>/kmt/session.json`, falling back to `~/.kmt/session.json`.
pub fn default_session_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        dir.join("kmt").join("session.json")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".kmt").join("session.json")
    } else {
        PathBuf::from(".kmt").join("session.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_parses() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.parsed_base().unwrap().path(), "/api");
        assert!(cfg.session_path.ends_with("session.json"));
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(ClientConfig::new("ftp://host/api").parsed_base(), Err(ApiError::Config(_))));
        assert!(matches!(ClientConfig::new("not a url").parsed_base(), Err(ApiError::Config(_))));
    }
}
