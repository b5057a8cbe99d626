use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::profile::ResumeProfile;
use crate::models::search::{PostedWithin, SearchParams};
use crate::notify::{Toast, TOAST_DURATION_MS};
use crate::session::{CurrentTab, Flight, TabState};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub toasts: Vec<Toast>,
    pub toast_duration_ms: u64,
    pub session_id: Option<String>,
    pub uploading: bool,
    pub searching: bool,
    pub profile: Option<ProfileView>,
    pub form: SearchFormView,
    /// Link back to the results this tab already holds.
    pub results_path: Option<String>,
}

/// The résumé analysis card.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub experience: String,
    pub tech_skill_count: usize,
    pub skill_count: usize,
    pub tech_preview: Vec<String>,
    pub hidden_tech_skills: usize,
}

impl From<&ResumeProfile> for ProfileView {
    fn from(profile: &ResumeProfile) -> Self {
        Self {
            experience: profile.experience_label(),
            tech_skill_count: profile.tech_skills.len(),
            skill_count: profile.skills.len(),
            tech_preview: profile.tech_skill_preview().to_vec(),
            hidden_tech_skills: profile.hidden_tech_skills(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchFormView {
    pub keywords: String,
    pub location: String,
    pub user_prompt: String,
    pub threshold: u8,
    pub use_llm_filtering: bool,
    pub windows: Vec<WindowOption>,
}

#[derive(Debug, Serialize)]
pub struct WindowOption {
    pub days: u32,
    pub label: &'static str,
    pub selected: bool,
}

impl From<&SearchParams> for SearchFormView {
    fn from(params: &SearchParams) -> Self {
        Self {
            keywords: params.keywords.clone(),
            location: params.location.clone(),
            user_prompt: params.user_prompt.clone(),
            threshold: params.match_score_threshold.value(),
            use_llm_filtering: params.use_llm_filtering,
            windows: PostedWithin::ALL
                .into_iter()
                .map(|w| WindowOption {
                    days: w.days(),
                    label: w.label(),
                    selected: w == params.posted_within_days,
                })
                .collect(),
        }
    }
}

/// Builds the home page for a tab, consuming its pending toasts.
pub fn home_view(state: &mut TabState, uploading: bool, searching: bool) -> HomeView {
    let results_path = state
        .store
        .search_results()
        .map(|results| results.session_id.results_path());
    HomeView {
        toasts: state.toasts.drain(),
        toast_duration_ms: TOAST_DURATION_MS,
        session_id: state.store.session_id().map(|id| id.to_string()),
        uploading,
        searching,
        profile: state.store.resume_profile().map(ProfileView::from),
        form: SearchFormView::from(&state.draft),
        results_path,
    }
}

/// GET /
pub async fn handle_home(
    State(state): State<AppState>,
    tab: CurrentTab,
) -> Result<impl IntoResponse, AppError> {
    let view = {
        let mut tab_state = tab.lock().await;
        home_view(
            &mut tab_state,
            tab.is_busy(Flight::Upload),
            tab.is_busy(Flight::Search),
        )
    };
    let page = state.pages.render("home.html", &view)?;
    Ok((tab.cookie(), page))
}
