//! Core domain errors.

use thiserror::Error;

/// Core domain errors for EduBot.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required request field was missing or malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An external resource (e.g. the lexicon file) does not exist.
    #[error("Resource not found: {0}")]
    ResourceMissing(String),

    /// Any other I/O failure while reading a resource.
    #[error("I/O error: {0}")]
    Io(String),
}
