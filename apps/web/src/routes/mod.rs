pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::pages::{home, results};
use crate::search::handlers as search;
use crate::session::handlers as session;
use crate::state::AppState;
use crate::upload::handlers as upload;

async fn not_found() -> AppError {
    AppError::NotFound("No such page".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(home::handle_home))
        .route("/results/:session_id", get(results::handle_results))
        .route("/results/:session_id/export", get(results::handle_export))
        // Form submissions (Post/Redirect/Get)
        .route("/upload", post(upload::handle_upload).layer(upload_limit))
        .route("/search", post(search::handle_search))
        .route("/session/clear", post(session::handle_clear))
        .fallback(not_found)
        .with_state(state)
}
