//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the storage backend answers within a bounded time.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let probe = state.storage.exists("health-check-non-existent-key");
    let (ready, storage_status) = match tokio::time::timeout(TIMEOUT, probe).await {
        Ok(Ok(_)) => (true, "ready".to_string()),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Storage readiness check failed");
            (false, format!("not_ready: {}", e))
        }
        Err(_) => {
            tracing::error!("Storage readiness check timed out");
            (false, "timeout".to_string())
        }
    };

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "storage": storage_status,
        })),
    )
}
