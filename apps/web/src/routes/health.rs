use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /health
/// Returns service status, version and whether the backend answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let backend = match state.backend.health().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!(error = %e, "backend health check failed");
            "unreachable"
        }
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobtracker-web",
        "backend": backend
    }))
}
