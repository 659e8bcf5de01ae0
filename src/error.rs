//! Unified client error model.
//! Every failure the gateway hands upward is classified here; the UI or CLI layer owns
//! the user-visible messaging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Fetch-level failure: connection refused, DNS, TLS, broken body stream.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response other than 401.
    #[error("HTTP error! status: {status}, message: {body}")]
    Http { status: u16, body: String },

    /// 401 from the backend. The session has been handed to the unauthorized handler.
    #[error("HTTP error! status: 401, message: {body}")]
    Unauthorized { body: String },

    /// The payload did not match the shape the endpoint promises.
    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    /// Rejected before any request was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "transport",
            ApiError::Http { .. } => "http",
            ApiError::Unauthorized { .. } => "unauthorized",
            ApiError::Decode { .. } => "decode",
            ApiError::Validation(_) => "validation",
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::Storage(_) => "storage",
            ApiError::Config(_) => "config",
        }
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response text for HTTP-level failures.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Http { body, .. } | ApiError::Unauthorized { body } => Some(body.as_str()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool { matches!(self, ApiError::Unauthorized { .. }) }

    pub fn decode<P: Into<String>, M: ToString>(path: P, msg: M) -> Self {
        ApiError::Decode { path: path.into(), message: msg.to_string() }
    }

    pub fn storage<M: ToString>(msg: M) -> Self { ApiError::Storage(msg.to_string()) }

    /// Classify a non-2xx status and its body text.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 {
            ApiError::Unauthorized { body }
        } else {
            ApiError::Http { status, body }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ApiError::from_status(401, "expired".into()).is_unauthorized());
        assert!(!ApiError::from_status(403, "forbidden".into()).is_unauthorized());
        assert_eq!(ApiError::from_status(500, "boom".into()).status(), Some(500));
        assert_eq!(ApiError::from_status(401, String::new()).status(), Some(401));
        assert_eq!(ApiError::decode("/User", "missing field").status(), None);
    }

    #[test]
    fn message_embeds_status_and_body() {
        let e = ApiError::from_status(404, "Department not found".into());
        assert_eq!(e.to_string(), "HTTP error! status: 404, message: Department not found");
        assert_eq!(e.body(), Some("Department not found"));
        assert_eq!(e.code_str(), "http");
        assert_eq!(ApiError::storage("disk full").code_str(), "storage");
    }
}
