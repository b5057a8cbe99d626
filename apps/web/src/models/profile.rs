use serde::{Deserialize, Serialize};

/// Number of technologies shown on the analysis card before collapsing.
pub const TECH_SKILL_PREVIEW: usize = 10;

/// Structured summary of a parsed résumé, as returned by the backend.
///
/// Only the fields rendered on the analysis card are decoded; anything else
/// the backend sends (raw text, tokens) is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub experience_years: f64,
    pub tech_skills: Vec<String>,
    pub skills: Vec<String>,
}

impl ResumeProfile {
    /// "5 years", "1 year", "2.5 years".
    pub fn experience_label(&self) -> String {
        let years = self.experience_years;
        if years.fract() == 0.0 {
            let whole = years as i64;
            if whole == 1 {
                "1 year".to_string()
            } else {
                format!("{whole} years")
            }
        } else {
            format!("{years:.1} years")
        }
    }

    pub fn tech_skill_preview(&self) -> &[String] {
        let end = self.tech_skills.len().min(TECH_SKILL_PREVIEW);
        &self.tech_skills[..end]
    }

    /// How many technologies are hidden behind the "+N more" marker.
    pub fn hidden_tech_skills(&self) -> usize {
        self.tech_skills.len().saturating_sub(TECH_SKILL_PREVIEW)
    }
}
