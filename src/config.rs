//! Configuration management for the TestFlow client.
//!
//! Configuration can be set via environment variables:
//! - `TESTFLOW_API_BASE_URL` - Optional. Backend base URL. Defaults to `http://localhost:8000`.
//! - `TESTFLOW_TIMEOUT_SECS` - Optional. Timeout for ordinary calls. Defaults to `10`.
//! - `TESTFLOW_AI_TIMEOUT_SECS` - Optional. Timeout for AI-backed synchronous calls. Defaults to `300`.
//! - `TESTFLOW_POLL_INTERVAL_MS` - Optional. Task status polling interval. Defaults to `2000`.
//! - `TESTFLOW_POLL_MAX_ATTEMPTS` - Optional. Maximum status polls per task. Defaults to `300`.
//! - `TESTFLOW_TOKEN` - Optional. Initial bearer credential for the session.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (scheme, host and optional port)
    pub base_url: String,

    /// Timeout applied to every request unless overridden per call
    pub timeout: Duration,

    /// Timeout for calls that run generative AI processing synchronously
    pub ai_timeout: Duration,

    /// Interval between task status polls
    pub poll_interval: Duration,

    /// Maximum number of status polls before giving up on a task
    pub poll_max_attempts: u32,

    /// Credential to seed the session with
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            ai_timeout: DEFAULT_AI_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse
    /// or the base URL is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TESTFLOW_API_BASE_URL")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "TESTFLOW_API_BASE_URL".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let timeout = parse_var::<u64, _>(&lookup, "TESTFLOW_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let ai_timeout = parse_var::<u64, _>(&lookup, "TESTFLOW_AI_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_AI_TIMEOUT);

        let poll_interval = parse_var::<u64, _>(&lookup, "TESTFLOW_POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let poll_max_attempts = parse_var::<u32, _>(&lookup, "TESTFLOW_POLL_MAX_ATTEMPTS")?
            .unwrap_or(DEFAULT_POLL_MAX_ATTEMPTS);

        let token = lookup("TESTFLOW_TOKEN").filter(|t| !t.trim().is_empty());

        Ok(Self {
            base_url,
            timeout,
            ai_timeout,
            poll_interval,
            poll_max_attempts,
            token,
        })
    }

    /// Create a config pointing at `base_url` with default timeouts (useful for testing).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e))),
        None => Ok(None),
    }
}
