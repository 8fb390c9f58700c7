//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
pub const DEFAULT_SESSION_FILE: &str = ".preparedness/session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// What the navigation guard does when the household check fails for a
/// reason other than "not found" or "unauthorized".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransientErrorPolicy {
    /// Let the navigation proceed.
    #[default]
    Allow,
    /// Keep the user on the current route.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeouts: ApiTimeouts,
    pub on_transient_error: TransientErrorPolicy,
    pub max_redirects: usize,
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeouts: ApiTimeouts::default(),
            on_transient_error: TransientErrorPolicy::default(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `PREP_API_BASE_URL`: default `http://localhost:8080/api`
    /// - `PREP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PREP_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PREP_ON_TRANSIENT_ERROR`: `allow` (default) or `block`
    /// - `PREP_MAX_REDIRECTS`: default 5
    /// - `PREP_SESSION_FILE`: default `.preparedness/session.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for an unknown transient-error policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("PREP_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let timeouts = ApiTimeouts {
            request_secs: parse_or(&lookup, "PREP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "PREP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let on_transient_error = parse_policy(lookup("PREP_ON_TRANSIENT_ERROR").as_deref())?;
        let max_redirects = parse_or(&lookup, "PREP_MAX_REDIRECTS", DEFAULT_MAX_REDIRECTS);
        let session_file =
            lookup("PREP_SESSION_FILE").map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        Ok(Self { api_base_url, timeouts, on_transient_error, max_redirects, session_file })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

fn parse_policy(raw: Option<&str>) -> Result<TransientErrorPolicy, ConfigError> {
    match raw.map(str::trim).unwrap_or("allow") {
        "allow" => Ok(TransientErrorPolicy::Allow),
        "block" => Ok(TransientErrorPolicy::Block),
        other => Err(ConfigError::Parse(format!(
            "unsupported PREP_ON_TRANSIENT_ERROR '{other}' (expected 'allow' or 'block')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
