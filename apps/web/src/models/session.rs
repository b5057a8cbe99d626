use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque session handle issued by the backend after a résumé upload.
///
/// The backend treats it as opaque; locally it must be usable as a single
/// URL path segment, so separators, percent signs, whitespace and control
/// characters are rejected when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSessionId {
    #[error("session id is empty")]
    Empty,
    #[error("session id contains disallowed character {0:?}")]
    DisallowedChar(char),
}

impl SessionId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidSessionId::Empty);
        }
        if let Some(c) = raw
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
        {
            return Err(InvalidSessionId::DisallowedChar(c));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters used to name exported files.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// In-app location of the results page for this session.
    pub fn results_path(&self) -> String {
        format!("/results/{}", self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = InvalidSessionId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
