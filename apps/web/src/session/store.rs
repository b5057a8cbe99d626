use thiserror::Error;

use crate::models::jobs::SearchResults;
use crate::models::profile::ResumeProfile;
use crate::models::session::SessionId;

/// Where a tab is in the upload → search flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    HasSession,
    HasResults,
}

#[derive(Debug, Error, PartialEq)]
#[error("results for session {got} do not belong to the current session")]
pub struct StaleResults {
    pub got: SessionId,
}

/// The three-field session record of one tab.
///
/// `session_id` and `resume_profile` are only ever set together, and stored
/// results always belong to the current `session_id`.
#[derive(Debug, Default)]
pub struct SessionStore {
    session_id: Option<SessionId>,
    resume_profile: Option<ResumeProfile>,
    search_results: Option<SearchResults>,
}

impl SessionStore {
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn resume_profile(&self) -> Option<&ResumeProfile> {
        self.resume_profile.as_ref()
    }

    pub fn search_results(&self) -> Option<&SearchResults> {
        self.search_results.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.session_id, &self.search_results) {
            (None, _) => SessionPhase::Empty,
            (Some(_), None) => SessionPhase::HasSession,
            (Some(_), Some(_)) => SessionPhase::HasResults,
        }
    }

    /// Starts a new session after a successful upload. Results of any
    /// previous session are dropped.
    pub fn begin_session(&mut self, session_id: SessionId, profile: ResumeProfile) {
        self.session_id = Some(session_id);
        self.resume_profile = Some(profile);
        self.search_results = None;
    }

    pub fn record_results(&mut self, results: SearchResults) -> Result<(), StaleResults> {
        if self.session_id.as_ref() != Some(&results.session_id) {
            return Err(StaleResults {
                got: results.session_id,
            });
        }
        self.search_results = Some(results);
        Ok(())
    }

    /// Results for `session_id` if this store currently holds them.
    pub fn results_for(&self, session_id: &SessionId) -> Option<&SearchResults> {
        self.search_results
            .as_ref()
            .filter(|r| &r.session_id == session_id)
    }

    /// Resets every field; returns the id of the session that was dropped.
    pub fn clear(&mut self) -> Option<SessionId> {
        self.resume_profile = None;
        self.search_results = None;
        self.session_id.take()
    }
}
