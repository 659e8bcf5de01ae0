//! Response body classification.
//!
//! Some backend endpoints wrap their payload as `{data, message, success}`, others answer
//! with the bare value. The body is classified once here so callers only ever see the
//! payload.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Keys that may accompany `data` in an envelope. An object with any other key is a
/// bare payload that happens to have a `data` field.
const ENVELOPE_KEYS: [&str; 4] = ["data", "message", "success", "errors"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub data: Value,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub errors: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Envelope(Envelope),
    Bare(Value),
}

impl ResponseBody {
    pub fn classify(value: Value) -> Self {
        let is_envelope = match &value {
            Value::Object(map) => map.contains_key("data") && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())),
            _ => false,
        };
        if !is_envelope {
            return ResponseBody::Bare(value);
        }
        match serde_json::from_value::<Envelope>(value.clone()) {
            Ok(env) => ResponseBody::Envelope(env),
            // e.g. a numeric `message`; keep the body untouched
            Err(_) => ResponseBody::Bare(value),
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            ResponseBody::Envelope(env) => {
                if env.success == Some(false) {
                    debug!(target: "kmt::client", message = ?env.message, "2xx envelope reported success=false");
                }
                env.data
            }
            ResponseBody::Bare(v) => v,
        }
    }
}

/// What a successful call produced, envelope already removed.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    Json(Value),
    /// Body was not JSON; kept verbatim.
    Text(String),
    Empty,
}

impl ApiPayload {
    pub fn from_body(text: &str) -> Self {
        if text.trim().is_empty() {
            return ApiPayload::Empty;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(v) => ApiPayload::Json(ResponseBody::classify(v).into_payload()),
            Err(_) => ApiPayload::Text(text.to_string()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ApiPayload::Json(v) => v,
            ApiPayload::Text(s) => Value::String(s),
            ApiPayload::Empty => Value::Null,
        }
    }

    /// Validate the payload against the endpoint's type.
    pub fn decode<T: DeserializeOwned>(self, path: &str) -> ApiResult<T> {
        match self {
            ApiPayload::Json(v) => serde_json::from_value(v).map_err(|e| ApiError::decode(path, e)),
            ApiPayload::Empty => serde_json::from_value(Value::Null).map_err(|_| ApiError::decode(path, "empty response body")),
            ApiPayload::Text(s) => {
                let preview: String = s.chars().take(120).collect();
                Err(ApiError::decode(path, format!("expected JSON, got text: {}", preview)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_is_unwrapped() {
        let p = ApiPayload::from_body(r#"{"data":[1,2,3],"message":"ok","success":true}"#);
        assert_eq!(p, ApiPayload::Json(json!([1, 2, 3])));

        let p = ApiPayload::from_body(r#"{"data":{"id":1}}"#);
        assert_eq!(p, ApiPayload::Json(json!({"id": 1})));

        let p = ApiPayload::from_body(r#"{"data":null,"success":false,"errors":["bad"]}"#);
        assert_eq!(p, ApiPayload::Json(Value::Null));
    }

    #[test]
    fn bare_payload_passes_through() {
        let p = ApiPayload::from_body(r#"[{"id":1}]"#);
        assert_eq!(p, ApiPayload::Json(json!([{"id": 1}])));

        // `data` next to foreign keys is not an envelope
        let body = json!({"data": [1], "totalCount": 1});
        assert_eq!(ApiPayload::from_body(&body.to_string()), ApiPayload::Json(body));

        assert_eq!(ApiPayload::from_body("42"), ApiPayload::Json(json!(42)));
    }

    #[test]
    fn non_json_falls_back_to_text() {
        assert_eq!(ApiPayload::from_body("Deleted"), ApiPayload::Text("Deleted".into()));
        assert_eq!(ApiPayload::from_body("   "), ApiPayload::Empty);
    }

    #[test]
    fn envelope_with_odd_metadata_stays_bare() {
        let body = json!({"data": 1, "message": 5});
        assert_eq!(ResponseBody::classify(body.clone()), ResponseBody::Bare(body));
    }

    #[test]
    fn decode_reports_path() {
        let err = ApiPayload::Text("<html>".into()).decode::<Vec<i64>>("/Department").unwrap_err();
        match err {
            ApiError::Decode { path, message } => {
                assert_eq!(path, "/Department");
                assert!(message.contains("<html>"));
            }
            other => panic!("unexpected {other:?}"),
        }
        ApiPayload::Empty.decode::<()>("/x").unwrap();
        let opt: Option<i64> = ApiPayload::Empty.decode("/x").unwrap();
        assert_eq!(opt, None);
    }
}
