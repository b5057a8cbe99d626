use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::profile::ResumeProfile;
use crate::models::search::{PostedWithin, SearchParams};
use crate::models::session::SessionId;

/// A job posting as scored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub apply_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Overall compatibility percentage, the ranking key.
    pub match_score: f64,
    #[serde(default)]
    pub semantic_score: Option<f64>,
    #[serde(default)]
    pub skill_match_score: Option<f64>,
    #[serde(default)]
    pub filter_score: Option<f64>,
    pub matched_skills: Vec<String>,
}

impl JobMatch {
    /// "Austin, TX", "Austin", "TX" or empty.
    pub fn location_label(&self) -> String {
        let parts: Vec<&str> = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(", ")
    }
}

/// Search parameters as the backend echoes them back.
///
/// Display only. The backend stores whatever a client sent, so these are not
/// held to the form's window and threshold grid.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub posted_within_days: u32,
    #[serde(default)]
    pub user_prompt: String,
    #[serde(default)]
    pub match_score_threshold: f64,
    #[serde(default)]
    pub use_llm_filtering: bool,
}

impl SearchCriteria {
    /// "Rust in Berlin · posted within 1 week · minimum match 60%".
    pub fn summary(&self) -> String {
        let window = match PostedWithin::try_from(self.posted_within_days) {
            Ok(known) => known.label().to_string(),
            Err(_) => format!("{} days", self.posted_within_days),
        };
        format!(
            "{} in {} · posted within {} · minimum match {}%",
            self.keywords, self.location, window, self.match_score_threshold
        )
    }
}

impl From<&SearchParams> for SearchCriteria {
    fn from(params: &SearchParams) -> Self {
        Self {
            keywords: params.keywords.clone(),
            location: params.location.clone(),
            posted_within_days: params.posted_within_days.days(),
            user_prompt: params.user_prompt.clone(),
            match_score_threshold: f64::from(params.match_score_threshold.value()),
            use_llm_filtering: params.use_llm_filtering,
        }
    }
}

/// Response of `POST /upload-resume`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    pub session_id: SessionId,
    pub resume_profile: ResumeProfile,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Response of `POST /search-jobs`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub session_id: SessionId,
    pub total_jobs: u32,
    pub filtered_jobs: u32,
    pub jobs: Vec<JobMatch>,
    #[serde(default)]
    pub search_params: Option<SearchCriteria>,
}

/// Response of `GET /search-results/{id}`: the latest results the backend saved.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedResults {
    pub total_jobs: u32,
    pub filtered_jobs: u32,
    pub jobs: Vec<JobMatch>,
    #[serde(default)]
    pub search_params: Option<SearchCriteria>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// Search results held for a session, whichever endpoint they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub session_id: SessionId,
    pub total_jobs: u32,
    pub filtered_jobs: u32,
    pub jobs: Vec<JobMatch>,
    pub search_params: Option<SearchCriteria>,
    pub searched_at: Option<NaiveDateTime>,
}

impl SearchResults {
    pub fn from_saved(session_id: SessionId, saved: SavedResults) -> Self {
        Self {
            session_id,
            total_jobs: saved.total_jobs,
            filtered_jobs: saved.filtered_jobs,
            jobs: saved.jobs,
            search_params: saved.search_params,
            searched_at: saved.timestamp,
        }
    }

    /// Jobs ordered best match first. Ties keep backend order.
    pub fn ranked(&self) -> Vec<&JobMatch> {
        let mut jobs: Vec<&JobMatch> = self.jobs.iter().collect();
        jobs.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        jobs
    }
}

impl From<SearchResponse> for SearchResults {
    fn from(resp: SearchResponse) -> Self {
        Self {
            session_id: resp.session_id,
            total_jobs: resp.total_jobs,
            filtered_jobs: resp.filtered_jobs,
            jobs: resp.jobs,
            search_params: resp.search_params,
            searched_at: Some(chrono::Local::now().naive_local()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(title: &str, score: f64) -> JobMatch {
        JobMatch {
            id: None,
            title: Some(title.to_string()),
            company: None,
            city: None,
            state: None,
            posted_at: None,
            apply_url: None,
            source: None,
            match_score: score,
            semantic_score: None,
            skill_match_score: None,
            filter_score: None,
            matched_skills: vec![],
        }
    }

    #[test]
    fn test_decodes_backend_search_response() {
        let raw = json!({
            "session_id": "abc",
            "total_jobs": 12,
            "filtered_jobs": 2,
            "jobs": [{
                "id": "j1",
                "title": "Platform Engineer",
                "company": "Acme",
                "city": "Austin",
                "state": "TX",
                "posted_at": "2024-05-01T00:00:00Z",
                "apply_url": "https://jobs.example/j1",
                "source": "jsearch",
                "raw": {"job_description": "..."},
                "match_score": 81.25,
                "matched_skills": ["rust", "aws"]
            }],
            "resume_profile": {"experience_years": 6, "tech_skills": ["rust"], "skills": ["rust"]},
            "search_params": {
                "keywords": "Platform",
                "location": "USA",
                "posted_within_days": 7,
                "user_prompt": "",
                "match_score_threshold": 50.0,
                "use_llm_filtering": false
            }
        });
        let resp: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.session_id.as_str(), "abc");
        assert_eq!(resp.filtered_jobs, 2);
        assert_eq!(resp.jobs[0].location_label(), "Austin, TX");
        assert_eq!(resp.search_params.unwrap().match_score_threshold, 50.0);
    }

    #[test]
    fn test_missing_filtered_count_fails_loudly() {
        let raw = json!({"session_id": "abc", "total_jobs": 1, "jobs": []});
        assert!(serde_json::from_value::<SearchResponse>(raw).is_err());
    }

    #[test]
    fn test_job_without_score_fails_loudly() {
        let raw = json!({"title": "Engineer", "matched_skills": []});
        assert!(serde_json::from_value::<JobMatch>(raw).is_err());
    }

    #[test]
    fn test_saved_results_accept_python_isoformat_timestamp() {
        let raw = json!({
            "total_jobs": 3,
            "filtered_jobs": 0,
            "jobs": [],
            "timestamp": "2024-06-01T09:30:15.123456"
        });
        let saved: SavedResults = serde_json::from_value(raw).unwrap();
        assert!(saved.timestamp.is_some());
    }

    #[test]
    fn test_saved_params_off_the_form_grid_still_decode() {
        let raw = json!({
            "total_jobs": 4,
            "filtered_jobs": 1,
            "jobs": [],
            "search_params": {
                "keywords": "Data Engineer",
                "location": "Remote",
                "posted_within_days": 2,
                "user_prompt": "",
                "match_score_threshold": 52.5,
                "use_llm_filtering": true
            }
        });
        let saved: SavedResults = serde_json::from_value(raw).unwrap();
        let criteria = saved.search_params.unwrap();
        assert_eq!(criteria.posted_within_days, 2);
        assert_eq!(criteria.match_score_threshold, 52.5);
        assert_eq!(
            criteria.summary(),
            "Data Engineer in Remote · posted within 2 days · minimum match 52.5%"
        );
    }

    #[test]
    fn test_criteria_from_form_params_uses_window_label() {
        let criteria = SearchCriteria::from(&SearchParams::default());
        assert_eq!(
            criteria.summary(),
            "Software Engineer in USA · posted within 1 week · minimum match 50%"
        );
    }

    #[test]
    fn test_ranked_orders_by_score_descending() {
        let results = SearchResults {
            session_id: SessionId::parse("s").unwrap(),
            total_jobs: 3,
            filtered_jobs: 3,
            jobs: vec![job("low", 40.0), job("high", 90.0), job("mid", 65.5)],
            search_params: None,
            searched_at: None,
        };
        let titles: Vec<_> = results
            .ranked()
            .into_iter()
            .map(|j| j.title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_location_label_skips_blanks() {
        let mut j = job("x", 1.0);
        assert_eq!(j.location_label(), "");
        j.state = Some("CA".to_string());
        assert_eq!(j.location_label(), "CA");
        j.city = Some(" ".to_string());
        assert_eq!(j.location_label(), "CA");
    }
}
