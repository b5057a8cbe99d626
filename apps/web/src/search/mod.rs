//! Search form: validates the posted draft, runs the search for the tab's
//! session and records the results.

pub mod handlers;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{ErrorKind, JobBackend};
use crate::models::search::{SearchDraft, SearchValidationError};
use crate::models::session::SessionId;
use crate::session::{Flight, Tab};

pub const UPLOAD_FIRST: &str = "Please upload your resume first";
pub const SEARCH_FAILED: &str = "Search failed. Please try again.";

#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found {
        session_id: SessionId,
        filtered_jobs: u32,
    },
    NoSession,
    /// The tab's session was cleared or replaced while the search ran; the
    /// results were dropped.
    Stale,
    /// Another search from this tab is still in flight; nothing happened.
    Busy,
    Invalid(SearchValidationError),
    Failed(ErrorKind),
}

impl SearchOutcome {
    /// Where the browser goes after the submission.
    pub fn redirect_to(&self) -> String {
        match self {
            SearchOutcome::Found { session_id, .. } => session_id.results_path(),
            _ => "/".to_string(),
        }
    }
}

pub fn found_message(filtered_jobs: u32) -> String {
    format!("Found {filtered_jobs} matching jobs!")
}

/// Runs one search for `tab`.
///
/// Without an active session nothing is sent. Any failure queues exactly one
/// error toast and leaves the store untouched.
pub async fn submit_search(
    backend: &dyn JobBackend,
    tab: &Arc<Tab>,
    draft: SearchDraft,
) -> SearchOutcome {
    let Some(_flight) = tab.try_begin(Flight::Search) else {
        debug!(tab = %tab.id(), "search already in flight, ignoring submission");
        return SearchOutcome::Busy;
    };

    let (session_id, params) = {
        let mut state = tab.lock().await;
        let Some(session_id) = state.store.session_id().cloned() else {
            state.toasts.error(UPLOAD_FIRST);
            return SearchOutcome::NoSession;
        };
        let params = match draft.validate() {
            Ok(params) => params,
            Err(e) => {
                state.toasts.error(e.to_string());
                return SearchOutcome::Invalid(e);
            }
        };
        state.draft = params.clone();
        (session_id, params)
    };

    debug!(
        session = %session_id,
        keywords = %params.keywords,
        threshold = params.match_score_threshold.value(),
        llm = params.use_llm_filtering,
        "searching jobs"
    );

    match backend.search_jobs(&session_id, &params).await {
        Ok(response) => {
            let filtered_jobs = response.filtered_jobs;
            let returned_id = response.session_id.clone();
            info!(
                session = %returned_id,
                total = response.total_jobs,
                filtered = filtered_jobs,
                "search completed"
            );

            let mut state = tab.lock().await;
            if let Err(stale) = state.store.record_results(response.into()) {
                warn!(tab = %tab.id(), error = %stale, "dropping results for a session this tab no longer holds");
                return SearchOutcome::Stale;
            }
            state.toasts.success(found_message(filtered_jobs));
            SearchOutcome::Found {
                session_id: returned_id,
                filtered_jobs,
            }
        }
        Err(e) => {
            warn!(
                tab = %tab.id(),
                session = %session_id,
                status = ?e.status(),
                error = %e,
                "job search failed"
            );
            tab.lock().await.toasts.error(SEARCH_FAILED);
            SearchOutcome::Failed(e.kind())
        }
    }
}
