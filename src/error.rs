//! Error types for jimaku-dl
//!
//! The taxonomy follows how the catalog API can fail:
//! - configuration problems are caught at construction
//! - authentication failures (HTTP 401) are never retried
//! - sustained rate limiting surfaces as [`Error::Throttled`]
//! - every other non-2xx status or network failure is a transport error
//!
//! "No result" (an empty or error JSON body) is not an error at all. It travels
//! through the pipeline as `None` and ends up as an empty candidate list.

use thiserror::Error;

/// Result type alias for jimaku-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jimaku-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_key")
        key: Option<String>,
    },

    /// The catalog rejected our credentials (HTTP 401)
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The rate-limit backoff ceiling was reached
    #[error("rate limit backoff limit of {attempts} reached, aborting")]
    Throttled {
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// Non-success HTTP status other than 401/429
    #[error("HTTP {status} for {url}")]
    Http {
        /// The status code returned by the server
        status: u16,
        /// The requested URL
        url: String,
    },

    /// Network error (connect failure, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed JSON payload
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure while reading a recognized archive
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// The transport session was used outside `initialize()`/`terminate()`
    #[error("session is not initialized")]
    SessionClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading archive members
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The container was recognized but could not be opened
    #[error("failed to open {format} archive: {reason}")]
    Open {
        /// Archive format name ("RAR", "ZIP")
        format: &'static str,
        /// Underlying reason
        reason: String,
    },

    /// A member could not be read
    #[error("failed to read member {member}: {reason}")]
    Read {
        /// Member name inside the archive
        member: String,
        /// Underlying reason
        reason: String,
    },

    /// The archive holds no subtitle file we could pick
    #[error("no subtitle member found among {count} archive entries")]
    NoSubtitleMember {
        /// Number of entries that were inspected
        count: usize,
    },
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// True for failures of the HTTP exchange itself (bad status, timeout, connect)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::Network(_))
    }

    /// Machine-readable error code for host-side reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Authentication(_) => "authentication_failed",
            Error::Throttled { .. } => "throttled",
            Error::Http { .. } => "http_error",
            Error::Network(e) if e.is_timeout() => "timeout",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Archive(_) => "archive_error",
            Error::SessionClosed => "session_closed",
            Error::Io(_) => "io_error",
        }
    }
}
