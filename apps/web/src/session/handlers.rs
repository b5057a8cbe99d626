use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tracing::{debug, info, warn};

use crate::session::CurrentTab;
use crate::state::AppState;

pub const SESSION_CLEARED: &str = "Session cleared";

/// POST /session/clear
///
/// The local store is reset first; deleting the session on the backend is
/// best effort and a failure there is only logged.
pub async fn handle_clear(State(state): State<AppState>, tab: CurrentTab) -> impl IntoResponse {
    let dropped = {
        let mut tab_state = tab.lock().await;
        debug!(tab = %tab.id(), phase = ?tab_state.store.phase(), "clearing session");
        let dropped = tab_state.store.clear();
        tab_state.toasts.success(SESSION_CLEARED);
        dropped
    };

    if let Some(session_id) = dropped {
        match state.backend.delete_session(&session_id).await {
            Ok(()) => info!(tab = %tab.id(), session = %session_id, "session cleared"),
            Err(e) => warn!(
                tab = %tab.id(),
                session = %session_id,
                error = %e,
                "backend did not delete session"
            ),
        }
    }

    (tab.cookie(), Redirect::to("/"))
}
