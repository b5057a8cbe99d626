use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the job-matching backend, e.g. `http://localhost:8000`.
    pub backend_url: String,
    /// Path prefix the backend mounts its API under.
    pub backend_api_prefix: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub tab_idle_minutes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?,
            backend_api_prefix: std::env::var("BACKEND_API_PREFIX")
                .unwrap_or_else(|_| "/api".to_string()),
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            tab_idle_minutes: parse_env("TAB_IDLE_MINUTES", 60)?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tab_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.tab_idle_minutes * 60)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(backend_url: &str) -> Self {
        Config {
            backend_url: backend_url.to_string(),
            backend_api_prefix: "/api".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            request_timeout_secs: 5,
            max_upload_bytes: 1024 * 1024,
            tab_idle_minutes: 60,
        }
    }
}
