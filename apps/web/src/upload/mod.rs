//! Upload widget: accepts one résumé, posts it to the backend and opens a
//! session in the tab's store.

pub mod handlers;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{ErrorKind, JobBackend};
use crate::models::document::{DocumentKind, ResumeFile};
use crate::models::session::SessionId;
use crate::session::{Flight, Tab};

pub const UPLOAD_SUCCESS: &str = "Resume uploaded and parsed successfully!";
pub const UPLOAD_FAILED: &str = "Failed to upload resume. Please try again.";

/// A file part as it arrived from the browser, before any checks.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Please choose a resume file to upload")]
    NoFile,
    #[error("Please upload a single resume file (got {0})")]
    TooMany(usize),
    #[error("Only PDF and DOCX files are supported")]
    UnsupportedType(String),
    #[error("The selected file is empty")]
    EmptyFile,
    #[error("Could not read the uploaded file: {0}")]
    Unreadable(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(SessionId),
    /// Another upload from this tab is still in flight; nothing happened.
    Busy,
    Rejected(UploadRejection),
    Failed(ErrorKind),
}

/// Applies the widget's input filter: exactly one non-empty PDF or DOCX.
pub fn accept(mut files: Vec<UploadCandidate>) -> Result<ResumeFile, UploadRejection> {
    let file = match files.len() {
        0 => return Err(UploadRejection::NoFile),
        1 => files.remove(0),
        n => return Err(UploadRejection::TooMany(n)),
    };

    let kind = DocumentKind::detect(&file.file_name, file.content_type.as_deref())
        .ok_or_else(|| UploadRejection::UnsupportedType(file.file_name.clone()))?;
    if file.bytes.is_empty() {
        return Err(UploadRejection::EmptyFile);
    }

    Ok(ResumeFile {
        file_name: file.file_name,
        kind,
        bytes: file.bytes,
    })
}

/// Runs one upload for `tab`.
///
/// Success replaces the tab's session with the backend's new one. Any
/// failure queues exactly one error toast and leaves the store untouched.
pub async fn submit_upload(
    backend: &dyn JobBackend,
    tab: &std::sync::Arc<Tab>,
    files: Result<Vec<UploadCandidate>, UploadRejection>,
) -> UploadOutcome {
    let Some(_flight) = tab.try_begin(Flight::Upload) else {
        debug!(tab = %tab.id(), "upload already in flight, ignoring submission");
        return UploadOutcome::Busy;
    };

    let file = match files.and_then(accept) {
        Ok(file) => file,
        Err(rejection) => {
            debug!(tab = %tab.id(), %rejection, "upload rejected");
            tab.lock().await.toasts.error(rejection.to_string());
            return UploadOutcome::Rejected(rejection);
        }
    };

    match backend.upload_resume(&file).await {
        Ok(receipt) => {
            let session_id = receipt.session_id;
            info!(
                tab = %tab.id(),
                session = %session_id,
                stored_as = ?receipt.filename,
                tech_skills = receipt.resume_profile.tech_skills.len(),
                "resume uploaded"
            );
            let mut state = tab.lock().await;
            state
                .store
                .begin_session(session_id.clone(), receipt.resume_profile);
            state.toasts.success(UPLOAD_SUCCESS);
            UploadOutcome::Uploaded(session_id)
        }
        Err(e) => {
            warn!(
                tab = %tab.id(),
                status = ?e.status(),
                error = %e,
                "resume upload failed"
            );
            tab.lock().await.toasts.error(UPLOAD_FAILED);
            UploadOutcome::Failed(e.kind())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{FakeBackend, Reply};
    use crate::session::{SessionPhase, TabRegistry};
    use crate::notify::ToastKind;
    use axum::http::HeaderMap;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn candidate(name: &str, content_type: Option<&str>, body: &'static [u8]) -> UploadCandidate {
        UploadCandidate {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(body),
        }
    }

    fn pdf() -> Vec<UploadCandidate> {
        vec![candidate("cv.pdf", Some("application/pdf"), b"%PDF-1.7")]
    }

    async fn new_tab() -> Arc<Tab> {
        TabRegistry::default().resolve(&HeaderMap::new()).await
    }

    #[test]
    fn test_accept_requires_exactly_one_supported_file() {
        assert_eq!(accept(vec![]).unwrap_err(), UploadRejection::NoFile);

        let two = vec![pdf().remove(0), pdf().remove(0)];
        assert_eq!(accept(two).unwrap_err(), UploadRejection::TooMany(2));

        let png = vec![candidate("me.png", Some("image/png"), b"\x89PNG")];
        assert!(matches!(accept(png), Err(UploadRejection::UnsupportedType(_))));

        let empty = vec![candidate("cv.docx", None, b"")];
        assert_eq!(accept(empty).unwrap_err(), UploadRejection::EmptyFile);

        let ok = accept(pdf()).unwrap();
        assert_eq!(ok.kind, DocumentKind::Pdf);
    }

    #[tokio::test]
    async fn test_successful_upload_opens_session() {
        let backend = FakeBackend::new("abc", 0);
        let tab = new_tab().await;

        let outcome = submit_upload(&backend, &tab, Ok(pdf())).await;
        assert_eq!(outcome, UploadOutcome::Uploaded(backend.session()));

        let mut state = tab.lock().await;
        assert_eq!(state.store.phase(), SessionPhase::HasSession);
        assert_eq!(state.store.session_id().unwrap().as_str(), "abc");
        assert_eq!(state.store.resume_profile(), Some(&FakeBackend::profile()));
        let toasts = state.toasts.drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[0].message, UPLOAD_SUCCESS);
        drop(state);
        assert!(!tab.is_busy(Flight::Upload));
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_session() {
        let backend = FakeBackend::new("first", 0);
        let tab = new_tab().await;
        submit_upload(&backend, &tab, Ok(pdf())).await;
        tab.lock().await.toasts.drain();

        backend.set_upload(Reply::Status(500));
        let outcome = submit_upload(&backend, &tab, Ok(pdf())).await;
        assert_eq!(outcome, UploadOutcome::Failed(ErrorKind::NetworkOrServer));

        let state = tab.lock().await;
        assert_eq!(state.store.session_id().unwrap().as_str(), "first");
        let toasts = state.toasts.peek();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].message, UPLOAD_FAILED);
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_a_failed_upload() {
        let backend = FakeBackend::new("abc", 0);
        backend.set_upload(Reply::SchemaMismatch);
        let tab = new_tab().await;

        let outcome = submit_upload(&backend, &tab, Ok(pdf())).await;
        assert_eq!(outcome, UploadOutcome::Failed(ErrorKind::SchemaMismatch));
        assert_eq!(tab.lock().await.store.phase(), SessionPhase::Empty);
    }

    #[tokio::test]
    async fn test_rejected_file_never_reaches_backend() {
        let backend = FakeBackend::new("abc", 0);
        let tab = new_tab().await;

        let doc = vec![candidate("cv.doc", Some("application/msword"), b"old")];
        let outcome = submit_upload(&backend, &tab, Ok(doc)).await;
        assert!(matches!(outcome, UploadOutcome::Rejected(UploadRejection::UnsupportedType(_))));
        assert_eq!(backend.upload_calls(), 0);

        let state = tab.lock().await;
        assert_eq!(state.toasts.len(), 1);
        assert_eq!(state.store.phase(), SessionPhase::Empty);
    }

    #[tokio::test]
    async fn test_upload_while_in_flight_is_a_noop() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend::new("abc", 0).gated(Arc::clone(&gate)));
        let tab = new_tab().await;

        let first = {
            let backend = Arc::clone(&backend);
            let tab = Arc::clone(&tab);
            tokio::spawn(async move { submit_upload(backend.as_ref(), &tab, Ok(pdf())).await })
        };
        while backend.upload_calls() == 0 {
            tokio::task::yield_now().await;
        }

        let second = submit_upload(backend.as_ref(), &tab, Ok(pdf())).await;
        assert_eq!(second, UploadOutcome::Busy);
        assert_eq!(backend.upload_calls(), 1);
        assert!(tab.lock().await.toasts.is_empty());

        gate.notify_one();
        assert_eq!(first.await.unwrap(), UploadOutcome::Uploaded(backend.session()));
        assert_eq!(tab.lock().await.toasts.len(), 1);
    }
}
