//! Error types for cappctl

use thiserror::Error;

/// Main error type for cappctl
#[derive(Error, Debug)]
pub enum CappError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    /// The response body could not be decoded as an envelope
    #[error("Malformed response from {path}: {reason}")]
    MalformedEnvelope { path: String, reason: String },

    /// The server answered but rejected the operation
    #[error("Request rejected: {}", rejection_message(.error, .friendly_error))]
    Rejected {
        error: String,
        friendly_error: String,
    },

    /// The envelope was accepted but carried no payload where one is required
    #[error("Empty payload from {0}")]
    EmptyPayload(String),

    #[error("No free hardware could be found to provision")]
    NoFreeHardware,

    #[error("{0}")]
    TaskFailed(String),

    #[error("Timed out waiting for {phase} after {attempts} polls")]
    PollTimeout { phase: String, attempts: u32 },

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// The friendly error when the server gave one, the raw error otherwise
fn rejection_message<'a>(error: &'a str, friendly_error: &'a str) -> &'a str {
    if friendly_error.is_empty() {
        error
    } else {
        friendly_error
    }
}
