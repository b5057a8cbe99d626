use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::ExportFormat;
use crate::errors::AppError;
use crate::models::jobs::{JobMatch, SearchCriteria, SearchResults};
use crate::models::session::SessionId;
use crate::notify::{Toast, TOAST_DURATION_MS};
use crate::session::CurrentTab;
use crate::state::AppState;

pub const RESULTS_UNAVAILABLE: &str = "Could not load results. Please search again.";
pub const EXPORT_FAILED: &str = "Export failed. Please try again.";

#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub toasts: Vec<Toast>,
    pub toast_duration_ms: u64,
    pub session_id: String,
    pub total_jobs: u32,
    pub filtered_jobs: u32,
    pub criteria: Option<String>,
    pub searched_at: Option<String>,
    pub export_csv: String,
    pub export_json: String,
    pub jobs: Vec<JobView>,
}

#[derive(Debug, Serialize)]
pub struct JobView {
    pub rank: usize,
    pub title: String,
    pub company: String,
    pub location: String,
    pub match_score: String,
    pub semantic_score: Option<String>,
    pub skill_match_score: Option<String>,
    pub filter_score: Option<String>,
    pub matched_skills: Vec<String>,
    pub posted_at: Option<String>,
    pub apply_url: Option<String>,
    pub source: Option<String>,
}

fn percent(score: f64) -> String {
    format!("{score:.1}%")
}

/// Apply links come from third-party job boards; only absolute http(s)
/// URLs are linked.
fn web_link(raw: &str) -> Option<String> {
    let url = reqwest::Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

impl JobView {
    fn new(rank: usize, job: &JobMatch) -> Self {
        Self {
            rank,
            title: job.title.clone().unwrap_or_else(|| "Untitled role".to_string()),
            company: job.company.clone().unwrap_or_else(|| "Unknown company".to_string()),
            location: job.location_label(),
            match_score: percent(job.match_score),
            semantic_score: job.semantic_score.map(percent),
            skill_match_score: job.skill_match_score.map(percent),
            filter_score: job.filter_score.map(percent),
            matched_skills: job.matched_skills.clone(),
            posted_at: job.posted_at.clone(),
            apply_url: job.apply_url.as_deref().and_then(web_link),
            source: job.source.clone(),
        }
    }
}

pub fn results_view(results: &SearchResults, toasts: Vec<Toast>) -> ResultsView {
    let export = |format: ExportFormat| {
        format!("{}/export?format={}", results.session_id.results_path(), format.as_str())
    };
    let criteria = results.search_params.as_ref().map(SearchCriteria::summary);

    ResultsView {
        toasts,
        toast_duration_ms: TOAST_DURATION_MS,
        session_id: results.session_id.to_string(),
        total_jobs: results.total_jobs,
        filtered_jobs: results.filtered_jobs,
        criteria,
        searched_at: results
            .searched_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
        export_csv: export(ExportFormat::Csv),
        export_json: export(ExportFormat::Json),
        jobs: results
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(i, job)| JobView::new(i + 1, job))
            .collect(),
    }
}

/// GET /results/:session_id
///
/// Serves the tab's own results when they belong to this session, otherwise
/// the latest results the backend saved for it.
pub async fn handle_results(
    State(state): State<AppState>,
    tab: CurrentTab,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let session_id = SessionId::parse(raw_id.as_str())
        .map_err(|_| AppError::NotFound(format!("No results for session '{raw_id}'")))?;

    let held = tab.lock().await.store.results_for(&session_id).cloned();
    let results = match held {
        Some(results) => results,
        None => match state.backend.saved_results(&session_id).await {
            Ok(saved) => {
                info!(session = %session_id, jobs = saved.jobs.len(), "loaded saved results");
                SearchResults::from_saved(session_id, saved)
            }
            Err(e) => {
                warn!(
                    tab = %tab.id(),
                    session = %session_id,
                    endpoint = %e.endpoint(),
                    status = ?e.status(),
                    error = %e,
                    "could not load results"
                );
                tab.lock().await.toasts.error(RESULTS_UNAVAILABLE);
                return Ok((tab.cookie(), Redirect::to("/")).into_response());
            }
        },
    };

    let view = {
        let mut tab_state = tab.lock().await;
        results_view(&results, tab_state.toasts.drain())
    };
    let page = state.pages.render("results.html", &view)?;
    Ok((tab.cookie(), page).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /results/:session_id/export?format=csv|json
///
/// Defaults to CSV when no format is given.
pub async fn handle_export(
    State(state): State<AppState>,
    tab: CurrentTab,
    Path(raw_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let session_id =
        SessionId::parse(raw_id).map_err(|e| AppError::Validation(e.to_string()))?;
    let format = query
        .format
        .as_deref()
        .unwrap_or("csv")
        .parse::<ExportFormat>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    match state.backend.export_results(&session_id, format).await {
        Ok(file) => {
            info!(session = %session_id, format = format.as_str(), bytes = file.bytes.len(), "exported results");
            let headers = [
                (CONTENT_TYPE, file.content_type),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.file_name),
                ),
            ];
            Ok((headers, file.bytes).into_response())
        }
        Err(e) => {
            warn!(
                tab = %tab.id(),
                session = %session_id,
                status = ?e.status(),
                error = %e,
                "export failed"
            );
            tab.lock().await.toasts.error(EXPORT_FAILED);
            Ok((tab.cookie(), Redirect::to(&session_id.results_path())).into_response())
        }
    }
}
