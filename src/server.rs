//! HTTP delivery for snapshots.
//!
//! `GET /api/system_info` captures one fresh snapshot per request on the
//! blocking pool and returns it as JSON. There is no cache: two requests
//! arriving together run two independent captures.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, info, warn};

use crate::VERSION;
use crate::error::CollectError;
use crate::system::collector::Collector;
use crate::system::snapshot::Snapshot;

#[derive(Clone)]
pub struct AppState {
    collector: Arc<Collector>,
    capture_timeout: Duration,
}

impl AppState {
    pub fn new(collector: Collector, capture_timeout: Duration) -> Self {
        AppState {
            collector: Arc::new(collector),
            capture_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/system_info", get(handle_system_info))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Request-level failure. No partial snapshot is ever returned.
pub struct ApiError(CollectError);

impl From<CollectError> for ApiError {
    fn from(err: CollectError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CollectError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(error = %self.0, %status, "snapshot request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Run one capture off the async runtime, bounded by `deadline`. A capture
/// that overruns keeps running on the blocking pool; its result is dropped.
pub async fn capture_with_deadline(
    collector: Arc<Collector>,
    deadline: Duration,
) -> Result<Snapshot, CollectError> {
    let task = tokio::task::spawn_blocking(move || collector.capture());
    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(CollectError::Join(join_err.to_string())),
        Err(_) => Err(CollectError::Timeout(deadline)),
    }
}

async fn handle_system_info(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = capture_with_deadline(state.collector.clone(), state.capture_timeout).await?;
    Ok(Json(snapshot))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

pub async fn serve(bind: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
