//!
//! kmt mock backend
//! ----------------
//! A small axum server that speaks the same contract as the HR backend, for local CLI
//! use and for the integration tests.
//!
//! - Everything lives under `/api`.
//! - Bearer tokens are issued by `/Auth/login` and checked on every other route; an
//!   unknown token answers 401.
//! - Some routes wrap their payload in the `{data, message, success}` envelope and some
//!   answer bare JSON, so both decoding paths of the client see traffic.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub mod handlers;
pub mod state;

pub use state::{MockDb, MockState, SEED_PASSWORD};

pub const PORT_ENV: &str = "KMT_MOCK_PORT";
pub const DEFAULT_PORT: u16 = 5000;

pub fn router(state: MockState) -> Router {
    use handlers::*;

    let api = Router::new()
        .route("/Auth/login", post(login))
        .route("/Auth/logout", post(logout))
        .route("/User", get(list_users).post(create_user))
        .route("/User/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/Department", get(list_departments).post(create_department))
        .route("/Department/{id}", get(get_department).put(update_department).delete(delete_department))
        .route("/LeaveRequest", get(list_leave_requests).post(create_leave_request))
        .route("/LeaveRequest/{id}/Approve", post(approve_leave))
        .route("/LeaveRequest/{id}/Reject", post(reject_leave))
        .route("/Mission", get(list_missions));

    Router::new()
        .route("/", get(|| async { "kmt mock ok" }))
        .nest("/api", api)
        .with_state(state)
}

/// Serve the seeded backend on `0.0.0.0:{port}` until the process exits.
pub async fn run(port: u16) -> anyhow::Result<()> {
    let app = router(MockState::seeded());
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    info!(target: "kmt::mock", "Starting mock backend on {} (base URL http://localhost:{}/api)", addr, port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Seeded backend on an OS-assigned loopback port, served from a background task.
pub async fn spawn_ephemeral() -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    spawn_with(MockState::seeded()).await
}

pub async fn spawn_with(state: MockState) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(target: "kmt::mock", "mock backend stopped: {}", e);
        }
    });
    Ok((addr, handle))
}

/// Base URL a client should use to reach a backend bound at `addr`.
pub fn base_url(addr: SocketAddr) -> String { format!("http://{}/api", addr) }
