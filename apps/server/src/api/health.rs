use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::main_lib::AppState;

async fn healthz() -> &'static str {
    "ok"
}

/// Ready when a pooled database connection can be checked out.
async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.pool.get() {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
