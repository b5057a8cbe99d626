//! Backend client: the single point of entry for every call to the
//! job-matching backend.
//!
//! Handlers and widgets only see the [`JobBackend`] trait; `AppState` carries
//! an `Arc<dyn JobBackend>` so tests can swap in a scripted backend.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::document::ResumeFile;
use crate::models::jobs::{SavedResults, SearchResponse, UploadReceipt};
use crate::models::search::SearchParams;
use crate::models::session::SessionId;

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Backend endpoints, used to label errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    UploadResume,
    SearchJobs,
    SearchResults,
    ExportResults,
    DeleteSession,
    Health,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::UploadResume => "POST /upload-resume",
            Endpoint::SearchJobs => "POST /search-jobs",
            Endpoint::SearchResults => "GET /search-results",
            Endpoint::ExportResults => "GET /export-results",
            Endpoint::DeleteSession => "DELETE /session",
            Endpoint::Health => "GET /health",
        })
    }
}

/// Coarse classification of backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, timeout or non-2xx response.
    NetworkOrServer,
    /// A 2xx response whose body does not decode into the expected schema.
    SchemaMismatch,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{endpoint}: request failed: {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint}: no response within {timeout:?}")]
    Timeout { endpoint: Endpoint, timeout: Duration },

    #[error("{endpoint}: backend returned {status}: {message}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    #[error("{endpoint}: response does not match the expected schema: {source}")]
    SchemaMismatch {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            BackendError::Network { .. }
            | BackendError::Timeout { .. }
            | BackendError::Status { .. } => ErrorKind::NetworkOrServer,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            BackendError::Network { endpoint, .. }
            | BackendError::Timeout { endpoint, .. }
            | BackendError::Status { endpoint, .. }
            | BackendError::SchemaMismatch { endpoint, .. } => *endpoint,
        }
    }

    /// HTTP status the backend answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Export
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Format must be 'csv' or 'json' (got '{0}')")]
pub struct UnknownExportFormat(pub String);

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(UnknownExportFormat(s.to_string())),
        }
    }
}

/// An exported result file ready to hand to the browser.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ExportFile {
    pub fn file_name_for(session_id: &SessionId, format: ExportFormat) -> String {
        format!("job_results_{}.{}", session_id.short(), format.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

/// Operations the front end needs from the job-matching backend.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Uploads one résumé; the backend parses it and opens a session.
    async fn upload_resume(&self, file: &ResumeFile) -> Result<UploadReceipt, BackendError>;

    /// Runs a search scoped to `session_id`.
    async fn search_jobs(
        &self,
        session_id: &SessionId,
        params: &SearchParams,
    ) -> Result<SearchResponse, BackendError>;

    /// Latest results the backend saved for `session_id`.
    async fn saved_results(&self, session_id: &SessionId) -> Result<SavedResults, BackendError>;

    async fn export_results(
        &self,
        session_id: &SessionId,
        format: ExportFormat,
    ) -> Result<ExportFile, BackendError>;

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), BackendError>;

    async fn health(&self) -> Result<(), BackendError>;
}
