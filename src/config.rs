//! Service configuration.
//!
//! Values are read from the environment, falling back to defaults.

use std::time::Duration;
use thiserror::Error;

pub const SERVICE_URL_VAR: &str = "ASSESS_SERVICE_URL";
pub const NOTIFY_TTL_VAR: &str = "ASSESS_NOTIFY_TTL_MS";
pub const REQUEST_TIMEOUT_VAR: &str = "ASSESS_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_NOTIFY_TTL: Duration = Duration::from_millis(3000);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid value for {var}: {value}")]
    InvalidDuration { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL the endpoint paths are appended to, without trailing slash.
    pub base_url: String,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
            notification_ttl: DEFAULT_NOTIFY_TTL,
            request_timeout: None,
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_url(base_url.into())?,
            ..Self::default()
        })
    }

    /// Loads the configuration.
    ///
    /// Priority:
    /// 1. Environment variables (`ASSESS_SERVICE_URL`, `ASSESS_NOTIFY_TTL_MS`,
    ///    `ASSESS_REQUEST_TIMEOUT_SECS`)
    /// 2. Defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(SERVICE_URL_VAR)
            .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());

        let notification_ttl = match std::env::var(NOTIFY_TTL_VAR) {
            Ok(raw) => Duration::from_millis(parse_number(NOTIFY_TTL_VAR, &raw)?),
            Err(_) => DEFAULT_NOTIFY_TTL,
        };

        let request_timeout = match std::env::var(REQUEST_TIMEOUT_VAR) {
            Ok(raw) => Some(Duration::from_secs(parse_number(REQUEST_TIMEOUT_VAR, &raw)?)),
            Err(_) => None,
        };

        let config = Self {
            base_url: normalize_url(base_url)?,
            notification_ttl,
            request_timeout,
        };

        #[cfg(feature = "tracing")]
        tracing::info!("Service configuration loaded: {}", config.base_url);

        Ok(config)
    }

    /// Full URL for an endpoint path such as `/scan`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_url(url: String) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        || trimmed.len() <= "https://".len()
    {
        return Err(ConfigError::InvalidUrl(url));
    }
    Ok(trimmed.to_string())
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidDuration {
        var,
        value: raw.to_string(),
    })
}
