//! Scripted in-memory backend for handler and widget tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

use crate::backend::{BackendError, Endpoint, ExportFile, ExportFormat, JobBackend};
use crate::models::document::ResumeFile;
use crate::models::jobs::{JobMatch, SavedResults, SearchResponse, UploadReceipt};
use crate::models::profile::ResumeProfile;
use crate::models::search::SearchParams;
use crate::models::session::SessionId;

/// What the fake answers for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Status(u16),
    SchemaMismatch,
}

pub struct FakeBackend {
    pub session_id: String,
    pub filtered_jobs: u32,
    pub upload_reply: Mutex<Reply>,
    pub search_reply: Mutex<Reply>,
    pub results_reply: Mutex<Reply>,
    pub delete_reply: Mutex<Reply>,
    /// When set, uploads and searches wait for a notification before answering.
    pub gate: Option<Arc<Notify>>,
    pub uploads: AtomicUsize,
    pub searches: AtomicUsize,
    pub deletes: AtomicUsize,
    pub last_search: Mutex<Option<(SessionId, SearchParams)>>,
}

impl FakeBackend {
    pub fn new(session_id: &str, filtered_jobs: u32) -> Self {
        Self {
            session_id: session_id.to_string(),
            filtered_jobs,
            upload_reply: Mutex::new(Reply::Ok),
            search_reply: Mutex::new(Reply::Ok),
            results_reply: Mutex::new(Reply::Ok),
            delete_reply: Mutex::new(Reply::Ok),
            gate: None,
            uploads: AtomicUsize::new(0),
            searches: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            last_search: Mutex::new(None),
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_upload(&self, reply: Reply) {
        *self.upload_reply.lock().unwrap() = reply;
    }

    pub fn set_search(&self, reply: Reply) {
        *self.search_reply.lock().unwrap() = reply;
    }

    pub fn set_results(&self, reply: Reply) {
        *self.results_reply.lock().unwrap() = reply;
    }

    pub fn set_delete(&self, reply: Reply) {
        *self.delete_reply.lock().unwrap() = reply;
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> SessionId {
        SessionId::parse(self.session_id.clone()).unwrap()
    }

    pub fn profile() -> ResumeProfile {
        ResumeProfile {
            experience_years: 5.0,
            tech_skills: vec!["rust".to_string(), "postgres".to_string()],
            skills: vec!["rust".to_string(), "postgres".to_string(), "leadership".to_string()],
        }
    }

    pub fn job(title: &str, score: f64) -> JobMatch {
        JobMatch {
            id: Some(format!("job-{title}")),
            title: Some(title.to_string()),
            company: Some("Acme".to_string()),
            city: Some("Berlin".to_string()),
            state: None,
            posted_at: Some("2024-05-01".to_string()),
            apply_url: Some(format!("https://jobs.example/{title}")),
            source: Some("jsearch".to_string()),
            match_score: score,
            semantic_score: Some(score - 5.0),
            skill_match_score: None,
            filter_score: None,
            matched_skills: vec!["rust".to_string()],
        }
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn fail(reply: Reply, endpoint: Endpoint) -> Option<BackendError> {
        match reply {
            Reply::Ok => None,
            Reply::Status(status) => Some(BackendError::Status {
                endpoint,
                status,
                message: "scripted failure".to_string(),
            }),
            Reply::SchemaMismatch => Some(BackendError::SchemaMismatch {
                endpoint,
                source: serde_json::from_str::<u32>("{}").unwrap_err(),
            }),
        }
    }
}

#[async_trait]
impl JobBackend for FakeBackend {
    async fn upload_resume(&self, _file: &ResumeFile) -> Result<UploadReceipt, BackendError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        let reply = *self.upload_reply.lock().unwrap();
        if let Some(err) = Self::fail(reply, Endpoint::UploadResume) {
            return Err(err);
        }
        Ok(UploadReceipt {
            session_id: self.session(),
            resume_profile: Self::profile(),
            filename: None,
        })
    }

    async fn search_jobs(
        &self,
        session_id: &SessionId,
        params: &SearchParams,
    ) -> Result<SearchResponse, BackendError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some((session_id.clone(), params.clone()));
        self.wait_gate().await;
        let reply = *self.search_reply.lock().unwrap();
        if let Some(err) = Self::fail(reply, Endpoint::SearchJobs) {
            return Err(err);
        }
        Ok(SearchResponse {
            session_id: session_id.clone(),
            total_jobs: 40,
            filtered_jobs: self.filtered_jobs,
            jobs: vec![Self::job("backend", 72.0), Self::job("systems", 91.0)],
            search_params: Some(params.into()),
        })
    }

    async fn saved_results(&self, _session_id: &SessionId) -> Result<SavedResults, BackendError> {
        let reply = *self.results_reply.lock().unwrap();
        if let Some(err) = Self::fail(reply, Endpoint::SearchResults) {
            return Err(err);
        }
        Ok(SavedResults {
            total_jobs: 12,
            filtered_jobs: 1,
            jobs: vec![Self::job("saved", 66.0)],
            search_params: None,
            timestamp: None,
        })
    }

    async fn export_results(
        &self,
        session_id: &SessionId,
        format: ExportFormat,
    ) -> Result<ExportFile, BackendError> {
        let reply = *self.results_reply.lock().unwrap();
        if let Some(err) = Self::fail(reply, Endpoint::ExportResults) {
            return Err(err);
        }
        Ok(ExportFile {
            file_name: ExportFile::file_name_for(session_id, format),
            content_type: format.content_type().to_string(),
            bytes: Bytes::from_static(b"Title,Company\nsaved,Acme\n"),
        })
    }

    async fn delete_session(&self, _session_id: &SessionId) -> Result<(), BackendError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let reply = *self.delete_reply.lock().unwrap();
        match Self::fail(reply, Endpoint::DeleteSession) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn health(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
