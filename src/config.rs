//! Configuration types for jimaku-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default catalog API base URL
pub const DEFAULT_API_URL: &str = "https://jimaku.cc/api";

/// Rate-limit handling for catalog API requests
///
/// The catalog answers HTTP 429 with an `x-ratelimit-reset-after` header. We wait
/// for the advertised time, capped at `max_delay`, and give up after
/// `backoff_limit` attempts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum number of attempts per request (default: 3)
    #[serde(default = "default_backoff_limit")]
    pub backoff_limit: u32,

    /// Upper bound on a single wait (default: 5 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Wait used when the server omits the reset header (default: 5 seconds)
    #[serde(default = "default_reset_after", with = "duration_serde")]
    pub default_reset_after: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            backoff_limit: default_backoff_limit(),
            max_delay: default_max_delay(),
            default_reset_after: default_reset_after(),
        }
    }
}

/// Main configuration for [`JimakuProvider`](crate::JimakuProvider)
///
/// Everything except the API key has a default, so the smallest valid
/// configuration is `Config::new("key")`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Catalog API key, sent verbatim in the `Authorization` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// Catalog API base URL (default: "https://jimaku.cc/api")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Offer ZIP/RAR uploads as candidates (default: true)
    #[serde(default = "default_true")]
    pub enable_archives: bool,

    /// Offer machine-transcribed subtitles as candidates (default: false)
    #[serde(default)]
    pub enable_ai_subs: bool,

    /// Per-request timeout (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Files reported smaller than this are considered corrupt (default: 500 bytes)
    #[serde(default = "default_corrupted_file_size_threshold")]
    pub corrupted_file_size_threshold: u64,

    /// Retry a file listing once with the absolute episode number (default: true)
    #[serde(default = "default_true")]
    pub retry_with_alternate_episode: bool,

    /// Rate-limit handling
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            enable_archives: true,
            enable_ai_subs: false,
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            corrupted_file_size_threshold: default_corrupted_file_size_threshold(),
            retry_with_alternate_episode: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    /// Default configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Check the configuration and return the API key
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the key is missing or blank, the backoff
    /// limit is zero, or the API URL is not an absolute URL.
    pub fn validate(&self) -> Result<&str> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(Error::config("missing api_key", "api_key")),
        };

        if self.rate_limit.backoff_limit == 0 {
            return Err(Error::config(
                "backoff_limit must allow at least one attempt",
                "rate_limit.backoff_limit",
            ));
        }

        url::Url::parse(&self.api_url)
            .map_err(|e| Error::config(format!("invalid api_url: {e}"), "api_url"))?;

        Ok(api_key)
    }

    /// API base URL without a trailing slash
    pub(crate) fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("jimaku-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_corrupted_file_size_threshold() -> u64 {
    500
}

fn default_backoff_limit() -> u32 {
    3
}

fn default_max_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_reset_after() -> Duration {
    Duration::from_secs(5)
}

// Durations are written as (fractional) seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog_limits() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://jimaku.cc/api");
        assert!(config.enable_archives);
        assert!(!config.enable_ai_subs);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.corrupted_file_size_threshold, 500);
        assert_eq!(config.rate_limit.backoff_limit, 3);
        assert_eq!(config.rate_limit.max_delay, Duration::from_secs(5));
        assert_eq!(config.rate_limit.default_reset_after, Duration::from_secs(5));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "api_key"));

        let err = Config::new("   ").validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn zero_backoff_limit_is_rejected() {
        let mut config = Config::new("key");
        config.rate_limit.backoff_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, Error::Config { key: Some(ref k), .. } if k == "rate_limit.backoff_limit")
        );
    }

    #[test]
    fn relative_api_url_is_rejected() {
        let mut config = Config::new("key");
        config.api_url = "jimaku.cc/api".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_returns_key_verbatim() {
        let config = Config::new("abc123");
        assert_eq!(config.validate().unwrap(), "abc123");
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"api_key": "k", "enable_archives": false, "rate_limit": {"max_delay": 2.5}}"#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert!(!config.enable_archives);
        assert_eq!(config.rate_limit.max_delay, Duration::from_millis(2500));
        assert_eq!(config.rate_limit.backoff_limit, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn api_base_strips_trailing_slash() {
        let mut config = Config::new("k");
        config.api_url = "http://localhost:1234/api/".into();
        assert_eq!(config.api_base(), "http://localhost:1234/api");
    }
}
