//! Error types for the compressor and the session layer.
//!
//! One `thiserror` enum per layer; each layer returns its own `…Result`.

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Failures of a single decode + resize + encode attempt.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum CompressionError {
    /// Source bytes could not be interpreted as an image
    #[error("Failed to load image: {0}")]
    Decoding(String),

    /// Re-encoding produced no output
    #[error("Failed to compress image: {0}")]
    Encoding(String),

    /// The blocking codec task panicked or was cancelled
    #[error("Compression task failed: {0}")]
    Task(String),
}

/// Errors talking to the authentication/permission service.
#[derive(Error, Debug, Serialize)]
pub enum SessionError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Service answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body did not have the expected shape
    #[error("Invalid response payload: {0}")]
    Payload(String),

    /// The user profile carries no registration number
    #[error("User registration not found")]
    MissingRegistration,
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug, Serialize)]
pub enum ConfigError {
    /// Setting failed validation
    #[error("Invalid setting: {0}")]
    Invalid(String),

    /// Settings file is not valid JSON for the expected type
    #[error("Malformed settings: {0}")]
    Parse(String),

    /// Settings file could not be read
    #[error("IO error: {0}")]
    IO(String),
}

/// Convenience result type for a single compression attempt.
pub type CompressionResult<T> = Result<T, CompressionError>;

/// Convenience result type for session and guard operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl CompressionError {
    pub fn decoding<T: Into<String>>(msg: T) -> Self {
        Self::Decoding(msg.into())
    }

    pub fn encoding<T: Into<String>>(msg: T) -> Self {
        Self::Encoding(msg.into())
    }
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None if err.is_decode() => Self::Payload(err.to_string()),
            None => Self::Http(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for CompressionError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}
