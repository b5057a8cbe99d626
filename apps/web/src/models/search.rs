use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Posted-within window
// ────────────────────────────────────────────────────────────────────────────

/// How recently a job must have been posted. Only the windows the backend
/// understands are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PostedWithin {
    OneDay,
    ThreeDays,
    #[default]
    OneWeek,
    TwoWeeks,
    OneMonth,
}

impl PostedWithin {
    pub const ALL: [PostedWithin; 5] = [
        PostedWithin::OneDay,
        PostedWithin::ThreeDays,
        PostedWithin::OneWeek,
        PostedWithin::TwoWeeks,
        PostedWithin::OneMonth,
    ];

    pub fn days(self) -> u32 {
        match self {
            PostedWithin::OneDay => 1,
            PostedWithin::ThreeDays => 3,
            PostedWithin::OneWeek => 7,
            PostedWithin::TwoWeeks => 14,
            PostedWithin::OneMonth => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostedWithin::OneDay => "1 day",
            PostedWithin::ThreeDays => "3 days",
            PostedWithin::OneWeek => "1 week",
            PostedWithin::TwoWeeks => "2 weeks",
            PostedWithin::OneMonth => "1 month",
        }
    }
}

impl TryFrom<u32> for PostedWithin {
    type Error = SearchValidationError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        PostedWithin::ALL
            .into_iter()
            .find(|w| w.days() == days)
            .ok_or(SearchValidationError::PostedWithin(days.to_string()))
    }
}

impl From<PostedWithin> for u32 {
    fn from(w: PostedWithin) -> Self {
        w.days()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Match score threshold
// ────────────────────────────────────────────────────────────────────────────

/// Minimum match percentage. Always a multiple of 5 in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "u8")]
pub struct MatchThreshold(u8);

impl MatchThreshold {
    pub const STEP: u8 = 5;
    pub const MAX: u8 = 100;

    /// Snaps any slider reading onto the 5-point grid inside `[0, 100]`.
    pub fn from_slider(raw: f64) -> Self {
        if raw.is_nan() {
            return MatchThreshold(0);
        }
        let step = f64::from(Self::STEP);
        let snapped = (raw / step).round() * step;
        MatchThreshold(snapped.clamp(0.0, f64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for MatchThreshold {
    fn default() -> Self {
        MatchThreshold(50)
    }
}

impl TryFrom<f64> for MatchThreshold {
    type Error = SearchValidationError;

    /// Strict conversion used when decoding: the value must already be on the grid.
    fn try_from(raw: f64) -> Result<Self, Self::Error> {
        let snapped = Self::from_slider(raw);
        if f64::from(snapped.0) == raw {
            Ok(snapped)
        } else {
            Err(SearchValidationError::Threshold(raw.to_string()))
        }
    }
}

impl From<MatchThreshold> for u8 {
    fn from(t: MatchThreshold) -> Self {
        t.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Search parameters
// ────────────────────────────────────────────────────────────────────────────

/// Query sent to the search endpoint. Built fresh from each form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub keywords: String,
    pub location: String,
    pub posted_within_days: PostedWithin,
    pub user_prompt: String,
    pub match_score_threshold: MatchThreshold,
    pub use_llm_filtering: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keywords: "Software Engineer".to_string(),
            location: "USA".to_string(),
            posted_within_days: PostedWithin::default(),
            user_prompt: "filter for relevant jobs".to_string(),
            match_score_threshold: MatchThreshold::default(),
            use_llm_filtering: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchValidationError {
    #[error("Job keywords are required")]
    MissingKeywords,
    #[error("Location is required")]
    MissingLocation,
    #[error("Posted-within must be 1, 3, 7, 14 or 30 days (got {0})")]
    PostedWithin(String),
    #[error("Minimum match score must be a number between 0 and 100 (got {0})")]
    Threshold(String),
}

/// Raw search form body. Every field defaults so that a malformed post still
/// reaches validation and is reported as a notification, not a rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchDraft {
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub posted_within_days: String,
    #[serde(default)]
    pub user_prompt: String,
    #[serde(default)]
    pub match_score_threshold: String,
    /// Checkboxes are only posted when checked.
    #[serde(default)]
    pub use_llm_filtering: Option<String>,
}

impl SearchDraft {
    pub fn validate(&self) -> Result<SearchParams, SearchValidationError> {
        let keywords = self.keywords.trim();
        if keywords.is_empty() {
            return Err(SearchValidationError::MissingKeywords);
        }
        let location = self.location.trim();
        if location.is_empty() {
            return Err(SearchValidationError::MissingLocation);
        }

        let days_raw = self.posted_within_days.trim();
        let posted_within_days = days_raw
            .parse::<u32>()
            .map_err(|_| SearchValidationError::PostedWithin(days_raw.to_string()))
            .and_then(PostedWithin::try_from)?;

        let threshold_raw = self.match_score_threshold.trim();
        let match_score_threshold = threshold_raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(MatchThreshold::from_slider)
            .ok_or_else(|| SearchValidationError::Threshold(threshold_raw.to_string()))?;

        Ok(SearchParams {
            keywords: keywords.to_string(),
            location: location.to_string(),
            posted_within_days,
            user_prompt: self.user_prompt.trim().to_string(),
            match_score_threshold,
            use_llm_filtering: self
                .use_llm_filtering
                .as_deref()
                .is_some_and(|v| matches!(v, "on" | "true" | "1")),
        })
    }
}
