//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors. Fatal: abort before entering any loop.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors from the game server's admin Web API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, bad body).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP status. Checked before envelope inspection.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The envelope arrived with `succeeded: false`.
    #[error("{message}")]
    Rejected { code: i32, message: String },

    /// `succeeded: true` but the payload was missing or malformed.
    #[error("Invalid response payload: {message}")]
    InvalidPayload { message: String },
}

/// A log line that looked structured but could not be parsed.
///
/// Distinct from "unrecognized": unrecognized lines are expected noise and
/// classify to no event, while these indicate a grammar violation on a line
/// that carries the bracketed timestamp prefix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventParseError {
    #[error("Malformed timestamp '{token}'")]
    BadTimestamp { token: String },

    #[error("Truncated line: expected at least {expected} fields, got {got}")]
    TruncatedLine { expected: usize, got: usize },
}

/// Result type alias for admin API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
