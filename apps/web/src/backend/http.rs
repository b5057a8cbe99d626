use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{BackendError, Endpoint, ExportFile, ExportFormat, JobBackend};
use crate::models::document::ResumeFile;
use crate::models::jobs::{SavedResults, SearchResponse, UploadReceipt};
use crate::models::search::SearchParams;
use crate::models::session::SessionId;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 300;

/// reqwest-backed [`JobBackend`]. Every request carries the client-wide
/// timeout; nothing is retried.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    /// Backend URL without the API prefix; `/health` lives here.
    root: String,
    /// Backend URL joined with the API prefix.
    base: String,
    timeout: Duration,
}

impl HttpBackend {
    /// `url` is the backend origin (`http://localhost:8000`), `api_prefix` the
    /// path its API is mounted under (`/api`, or empty).
    pub fn new(url: &str, api_prefix: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;
        let root = url.trim_end_matches('/').to_string();
        let prefix = api_prefix.trim_matches('/');
        let base = if prefix.is_empty() {
            root.clone()
        } else {
            format!("{root}/{prefix}")
        };
        Ok(Self {
            client,
            root,
            base,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn transport_error(&self, endpoint: Endpoint, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout {
                endpoint,
                timeout: self.timeout,
            }
        } else {
            BackendError::Network {
                endpoint,
                source: err,
            }
        }
    }

    /// Sends the request and turns any non-2xx answer into `BackendError::Status`.
    async fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if status.is_success() {
            debug!(%endpoint, status = status.as_u16(), "backend call succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body);
        warn!(%endpoint, status = status.as_u16(), %message, "backend call failed");
        Err(BackendError::Status {
            endpoint,
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        response: Response,
    ) -> Result<T, BackendError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        serde_json::from_slice(&body).map_err(|source| {
            warn!(%endpoint, error = %source, "backend response did not match schema");
            BackendError::SchemaMismatch { endpoint, source }
        })
    }
}

/// Pulls FastAPI's `{"detail": ...}` out of an error body, or keeps the raw text.
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .map(|d| match d {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| body.trim().to_string());

    if detail.chars().count() > MAX_ERROR_BODY {
        let cut: String = detail.chars().take(MAX_ERROR_BODY).collect();
        format!("{cut}…")
    } else {
        detail
    }
}

#[async_trait]
impl JobBackend for HttpBackend {
    async fn upload_resume(&self, file: &ResumeFile) -> Result<UploadReceipt, BackendError> {
        let endpoint = Endpoint::UploadResume;
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.upload_name())
            .mime_str(file.kind.mime())
            .map_err(|e| self.transport_error(endpoint, e))?;
        let form = Form::new().part("file", part);

        debug!(file = %file.file_name, size = file.bytes.len(), "uploading resume");
        let response = self
            .send(endpoint, self.client.post(self.url("/upload-resume")).multipart(form))
            .await?;
        self.read_json(endpoint, response).await
    }

    async fn search_jobs(
        &self,
        session_id: &SessionId,
        params: &SearchParams,
    ) -> Result<SearchResponse, BackendError> {
        let endpoint = Endpoint::SearchJobs;
        let request = self
            .client
            .post(self.url("/search-jobs"))
            .query(&[("session_id", session_id.as_str())])
            .json(params);
        let response = self.send(endpoint, request).await?;
        self.read_json(endpoint, response).await
    }

    async fn saved_results(&self, session_id: &SessionId) -> Result<SavedResults, BackendError> {
        let endpoint = Endpoint::SearchResults;
        let request = self
            .client
            .get(self.url(&format!("/search-results/{session_id}")));
        let response = self.send(endpoint, request).await?;
        self.read_json(endpoint, response).await
    }

    async fn export_results(
        &self,
        session_id: &SessionId,
        format: ExportFormat,
    ) -> Result<ExportFile, BackendError> {
        let endpoint = Endpoint::ExportResults;
        let request = self
            .client
            .get(self.url(&format!("/export-results/{session_id}")))
            .query(&[("format", format.as_str())]);
        let response = self.send(endpoint, request).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format.content_type().to_string());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        Ok(ExportFile {
            file_name: ExportFile::file_name_for(session_id, format),
            content_type,
            bytes,
        })
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), BackendError> {
        let request = self.client.delete(self.url(&format!("/session/{session_id}")));
        self.send(Endpoint::DeleteSession, request).await?;
        Ok(())
    }

    async fn health(&self) -> Result<(), BackendError> {
        self.send(Endpoint::Health, self.client.get(format!("{}/health", self.root)))
            .await?;
        Ok(())
    }
}
