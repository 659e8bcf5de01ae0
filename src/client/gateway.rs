//! The one place network requests are issued.
//!
//! Every call: absolute URL from the configured base, JSON content type, bearer token
//! when one is stored, one attempt, payload unwrapped. A 401 is classified as
//! `ApiError::Unauthorized` and handed to the injected `UnauthorizedHandler` before it
//! reaches the caller.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::identity::SessionStore;
use crate::navigation::Navigator;

use super::envelope::ApiPayload;
use super::interceptor::{SessionTeardown, UnauthorizedHandler};
use super::query::QueryParams;

/// A single call: relative path, method, optional JSON body and extra headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: QueryParams::new(), body: None, headers: HeaderMap::new() }
    }

    pub fn get(path: impl Into<String>) -> Self { Self::new(Method::GET, path) }
    pub fn post(path: impl Into<String>) -> Self { Self::new(Method::POST, path) }
    pub fn put(path: impl Into<String>) -> Self { Self::new(Method::PUT, path) }
    pub fn delete(path: impl Into<String>) -> Self { Self::new(Method::DELETE, path) }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let v = serde_json::to_value(body).map_err(|e| ApiError::Validation(format!("body for {}: {}", self.path, e)))?;
        self.body = Some(v);
        Ok(self)
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    session: SessionStore,
    on_unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    /// Client with the default 401 policy: clear the session and navigate to the login path.
    pub fn new(config: &ClientConfig, session: SessionStore, navigator: Arc<dyn Navigator>) -> ApiResult<Self> {
        let handler = Arc::new(SessionTeardown::new(navigator, config.paths.login.clone()));
        Self::with_handler(config, session, handler)
    }

    pub fn with_handler(config: &ClientConfig, session: SessionStore, on_unauthorized: Arc<dyn UnauthorizedHandler>) -> ApiResult<Self> {
        let base = config.parsed_base()?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base, http, session, on_unauthorized })
    }

    pub fn session(&self) -> &SessionStore { &self.session }

    pub fn base_url(&self) -> &Url { &self.base }

    /// Base URL + relative path (+ query). The base's own path prefix is preserved.
    pub fn url_for(&self, path: &str, query: &QueryParams) -> ApiResult<Url> {
        let base = self.base.as_str().trim_end_matches('/');
        let rel = path.trim_start_matches('/');
        let mut full = format!("{}/{}", base, rel);
        if !query.is_empty() {
            full.push(if rel.contains('?') { '&' } else { '?' });
            full.push_str(&query.to_query_string());
        }
        Url::parse(&full).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", full, e)))
    }

    fn default_headers(&self) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.session.token() {
            let v = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::storage("stored token is not a valid header value"))?;
            headers.insert(AUTHORIZATION, v);
        }
        Ok(headers)
    }

    pub async fn send(&self, req: ApiRequest) -> ApiResult<ApiPayload> {
        let url = self.url_for(&req.path, &req.query)?;
        let mut headers = self.default_headers()?;
        for (name, value) in req.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        let mut builder = self.http.request(req.method.clone(), url).headers(headers);
        if let Some(body) = &req.body {
            let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Validation(e.to_string()))?;
            builder = builder.body(bytes);
        }

        debug!(target: "kmt::client", method = %req.method, path = %req.path, "request");
        let resp = builder.send().await.map_err(|e| {
            warn!(target: "kmt::client", method = %req.method, path = %req.path, "transport failure: {}", e);
            ApiError::Transport(e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = ApiError::from_status(status.as_u16(), body);
            if err.is_unauthorized() {
                warn!(target: "kmt::client", method = %req.method, path = %req.path, "401 from backend");
                self.on_unauthorized.on_unauthorized(&self.session);
            } else {
                debug!(target: "kmt::client", status = status.as_u16(), path = %req.path, "request failed");
            }
            return Err(err);
        }
        let text = resp.text().await?;
        Ok(ApiPayload::from_body(&text))
    }

    /// Generic call with the payload as loose JSON.
    pub async fn request(&self, path: &str, method: Method, body: Option<&Value>, extra_headers: Option<HeaderMap>) -> ApiResult<Value> {
        let mut req = ApiRequest::new(method, path);
        req.body = body.cloned();
        if let Some(h) = extra_headers {
            req.headers = h;
        }
        Ok(self.send(req).await?.into_value())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: QueryParams) -> ApiResult<T> {
        self.send(ApiRequest::get(path).query(query)).await?.decode(path)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(ApiRequest::post(path).json(body)?).await?.decode(path)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(ApiRequest::put(path).json(body)?).await?.decode(path)
    }

    /// DELETE; whatever the backend answers on success is discarded.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// POST/PUT for action endpoints whose response body carries nothing the caller needs.
    pub async fn post_action<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiPayload> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put_action<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiPayload> {
        self.send(ApiRequest::put(path).json(body)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let handler: Arc<dyn UnauthorizedHandler> = Arc::new(|_: &SessionStore| {});
        ApiClient::with_handler(&ClientConfig::new(base), SessionStore::in_memory(), handler).unwrap()
    }

    #[test]
    fn url_keeps_base_prefix() {
        let c = client("http://localhost:5000/api/");
        let u = c.url_for("/Department", &QueryParams::new()).unwrap();
        assert_eq!(u.as_str(), "http://localhost:5000/api/Department");
        let u = c.url_for("User/3/Roles", &QueryParams::new()).unwrap();
        assert_eq!(u.as_str(), "http://localhost:5000/api/User/3/Roles");
    }

    #[test]
    fn url_appends_query() {
        let c = client("http://localhost:5000/api");
        let q = QueryParams::new().push("search", "x").opt::<u32>("page", None);
        assert_eq!(c.url_for("/User", &q).unwrap().as_str(), "http://localhost:5000/api/User?search=x");
        let q = QueryParams::new().push("b", 2);
        assert_eq!(c.url_for("/User?a=1", &q).unwrap().as_str(), "http://localhost:5000/api/User?a=1&b=2");
    }

    #[test]
    fn auth_header_only_with_token() {
        let c = client("http://localhost:5000/api");
        let h = c.default_headers().unwrap();
        assert!(h.get(AUTHORIZATION).is_none());
        assert_eq!(h.get(CONTENT_TYPE).unwrap(), "application/json");

        c.session().set_auth("abc", &crate::identity::User::from_login_email("a@b.com")).unwrap();
        let h = c.default_headers().unwrap();
        assert_eq!(h.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }
}
