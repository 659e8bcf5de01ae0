use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use kmt_hr::client::{ApiClient, ApiPayload, QueryParams, UnauthorizedHandler};
use kmt_hr::config::ClientConfig;
use kmt_hr::error::ApiError;
use kmt_hr::identity::{Role, SessionStore, User};
use kmt_hr::navigation::{MemoryNavigator, Navigator};

#[derive(Clone, Default)]
struct Hits(Arc<AtomicUsize>);

async fn echo_auth(headers: HeaderMap) -> impl IntoResponse {
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
    let ct = headers.get("content-type").and_then(|v| v.to_str().ok()).map(str::to_string);
    let extra = headers.get("x-trace").and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({ "authorization": auth, "contentType": ct, "trace": extra }))
}

async fn boom(State(hits): State<Hits>) -> impl IntoResponse {
    hits.0.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "kaboom")
}

async fn slow(Path(n): Path<u64>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(20 * (5 - n % 5))).await;
    Json(json!({ "data": { "n": n }, "success": true }))
}

// Backend double with one route per response shape the gateway must handle.
async fn start_backend() -> (SocketAddr, JoinHandle<()>, Hits) {
    let hits = Hits::default();
    let api = Router::new()
        .route("/echo", get(echo_auth).post(echo_auth))
        .route("/enveloped", get(|| async { Json(json!({"data": {"id": 7, "name": "Ops"}, "message": "ok", "success": true})) }))
        .route("/data-field", get(|| async { Json(json!({"data": [1, 2], "count": 2})) }))
        .route("/private", get(|| async { (StatusCode::UNAUTHORIZED, "token expired") }))
        .route("/forbidden", get(|| async { (StatusCode::FORBIDDEN, Json(json!({"message": "no"}))) }))
        .route("/boom", get(boom))
        .route("/plain", get(|| async { "hello there" }))
        .route("/empty", post(|| async { StatusCode::NO_CONTENT }))
        .route("/wrong-shape", get(|| async { Json(json!({"id": "seven"})) }))
        .route("/slow/{n}", get(slow))
        .route("/Auth/login", post(|| async { Json(json!({"token": "tok-1"})) }))
        .with_state(hits.clone());
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, handle, hits)
}

fn client_for(addr: SocketAddr, start_path: &str) -> (ApiClient, Arc<MemoryNavigator>) {
    let nav = Arc::new(MemoryNavigator::new(start_path));
    let cfg = ClientConfig::new(format!("http://{}/api", addr));
    let client = ApiClient::new(&cfg, SessionStore::in_memory(), nav.clone()).expect("client");
    (client, nav)
}

fn sample_user() -> User {
    User { id: 3, name: "Sara".into(), email: "sara@kmt.io".into(), role: Role::HrManager, ..User::from_login_email("sara@kmt.io") }
}

#[tokio::test]
async fn no_authorization_header_without_token() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/");

    let v: Value = client.get("/echo", QueryParams::new()).await.unwrap();
    assert_eq!(v["authorization"], Value::Null);
    assert_eq!(v["contentType"], "application/json");
    handle.abort();
}

#[tokio::test]
async fn bearer_header_is_exact() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/");
    client.session().set_auth("abc.def", &sample_user()).unwrap();

    let v: Value = client.get("/echo", QueryParams::new()).await.unwrap();
    assert_eq!(v["authorization"], "Bearer abc.def");
    handle.abort();
}

#[tokio::test]
async fn caller_headers_are_merged_last() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/");
    let mut extra = reqwest::header::HeaderMap::new();
    extra.insert("x-trace", "t-1".parse().unwrap());

    let v = client.request("/echo", Method::POST, Some(&json!({"a": 1})), Some(extra)).await.unwrap();
    assert_eq!(v["trace"], "t-1");
    assert_eq!(v["contentType"], "application/json");
    handle.abort();
}

#[tokio::test]
async fn envelope_is_unwrapped_but_lookalikes_are_not() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/");

    let v: Value = client.get("/enveloped", QueryParams::new()).await.unwrap();
    assert_eq!(v, json!({"id": 7, "name": "Ops"}));

    let v: Value = client.get("/data-field", QueryParams::new()).await.unwrap();
    assert_eq!(v, json!({"data": [1, 2], "count": 2}));
    handle.abort();
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_once() {
    let (addr, handle, _) = start_backend().await;
    let (client, nav) = client_for(addr, "/departments");
    client.session().set_auth("stale", &sample_user()).unwrap();

    let err = client.get::<Value>("/private", QueryParams::new()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.body(), Some("token expired"));
    assert!(!client.session().is_authenticated());
    assert!(client.session().user().is_none());
    assert_eq!(nav.history(), vec!["/login".to_string()]);

    // already on the login view: session cleared again, no second navigation
    let _ = client.get::<Value>("/private", QueryParams::new()).await;
    assert_eq!(nav.history().len(), 1);
    assert_eq!(nav.current_path(), "/login");
    handle.abort();
}

#[tokio::test]
async fn custom_unauthorized_handler_runs() {
    let (addr, handle, _) = start_backend().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let handler: Arc<dyn UnauthorizedHandler> = Arc::new(move |_: &SessionStore| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let cfg = ClientConfig::new(format!("http://{}/api", addr));
    let client = ApiClient::with_handler(&cfg, SessionStore::in_memory(), handler).unwrap();
    client.session().set_auth("kept", &sample_user()).unwrap();

    let _ = client.get::<Value>("/private", QueryParams::new()).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(client.session().is_authenticated());
    handle.abort();
}

#[tokio::test]
async fn server_error_is_single_attempt_and_keeps_session() {
    let (addr, handle, hits) = start_backend().await;
    let (client, nav) = client_for(addr, "/");
    client.session().set_auth("tok", &sample_user()).unwrap();

    let err = client.get::<Value>("/boom", QueryParams::new()).await.unwrap_err();
    match &err {
        ApiError::Http { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "kaboom");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "HTTP error! status: 500, message: kaboom");
    assert_eq!(hits.0.load(Ordering::SeqCst), 1);
    assert!(client.session().is_authenticated());
    assert!(nav.history().is_empty());

    let err = client.get::<Value>("/forbidden", QueryParams::new()).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(client.session().is_authenticated());
    handle.abort();
}

#[tokio::test]
async fn non_json_bodies_are_kept_as_text() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/");

    let v = client.request("/plain", Method::GET, None, None).await.unwrap();
    assert_eq!(v, Value::String("hello there".into()));

    let err = client.get::<Vec<i64>>("/plain", QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { ref path, .. } if path == "/plain"));

    let payload = client.post_action("/empty", &json!({})).await.unwrap();
    assert_eq!(payload, ApiPayload::Empty);
    handle.abort();
}

#[tokio::test]
async fn typed_decode_failure_names_the_endpoint() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/");

    let err = client.get::<User>("/wrong-shape", QueryParams::new()).await.unwrap_err();
    assert_eq!(err.code_str(), "decode");
    assert!(err.to_string().contains("/wrong-shape"));
    handle.abort();
}

#[tokio::test]
async fn token_only_login_synthesizes_user() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/login");

    let s = client.login("a@b.com", "x").await.unwrap();
    assert_eq!(s.token, "tok-1");
    assert_eq!(s.user.name, "a");
    assert_eq!(s.user.email, "a@b.com");
    assert_eq!(s.user.role, Role::Default);
    assert_eq!(client.session().token().as_deref(), Some("tok-1"));
    handle.abort();
}

#[tokio::test]
async fn transport_failure_is_typed() {
    // nothing listens on the discard port
    let cfg = ClientConfig::new("http://127.0.0.1:9/api");
    let client = ApiClient::new(&cfg, SessionStore::in_memory(), Arc::new(MemoryNavigator::default())).unwrap();
    let err = client.get::<Value>("/User", QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn concurrent_calls_resolve_independently() {
    let (addr, handle, _) = start_backend().await;
    let (client, _) = client_for(addr, "/");
    client.session().set_auth("tok", &sample_user()).unwrap();

    let calls = (0..10u64).map(|n| {
        let c = client.clone();
        async move { c.get::<Value>(&format!("/slow/{}", n), QueryParams::new()).await }
    });
    let results = futures::future::join_all(calls).await;
    for (n, r) in results.into_iter().enumerate() {
        assert_eq!(r.unwrap(), json!({"n": n}));
    }
    handle.abort();
}
