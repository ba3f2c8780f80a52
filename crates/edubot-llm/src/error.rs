//! Error types for the completion client.

use thiserror::Error;

/// Errors that can occur while talking to the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed stream framing.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// No response or no frame within the configured timeout.
    #[error("Timeout waiting for completion service")]
    Timeout,
}
