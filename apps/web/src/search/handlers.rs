use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Form,
};
use tracing::debug;

use crate::models::search::SearchDraft;
use crate::search::submit_search;
use crate::session::CurrentTab;
use crate::state::AppState;

/// POST /search
///
/// Redirects to `/results/{session_id}` on success, otherwise back home with
/// the failure queued as a toast.
pub async fn handle_search(
    State(state): State<AppState>,
    tab: CurrentTab,
    Form(draft): Form<SearchDraft>,
) -> impl IntoResponse {
    let outcome = submit_search(state.backend.as_ref(), &tab, draft).await;
    debug!(tab = %tab.id(), ?outcome, "search handled");
    (tab.cookie(), Redirect::to(&outcome.redirect_to()))
}
