//! Axum route handler for the upload widget.

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use crate::session::CurrentTab;
use crate::state::AppState;
use crate::upload::{submit_upload, UploadCandidate, UploadRejection};

/// Multipart field carrying the résumé.
const FILE_FIELD: &str = "file";

/// POST /upload
///
/// Post/Redirect/Get: the outcome is queued as a toast and the browser is
/// sent back to the home page.
pub async fn handle_upload(
    State(state): State<AppState>,
    tab: CurrentTab,
    multipart: Multipart,
) -> impl IntoResponse {
    let files = read_files(multipart).await;
    let outcome = submit_upload(state.backend.as_ref(), &tab, files).await;
    debug!(tab = %tab.id(), ?outcome, "upload handled");
    (tab.cookie(), Redirect::to("/"))
}

/// Collects every `file` part. Browsers post an empty, unnamed part when no
/// file was chosen; those are skipped.
async fn read_files(mut multipart: Multipart) -> Result<Vec<UploadCandidate>, UploadRejection> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadRejection::Unreadable(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadRejection::Unreadable(e.body_text()))?;

        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }
        files.push(UploadCandidate {
            file_name,
            content_type,
            bytes,
        });
    }
    Ok(files)
}
