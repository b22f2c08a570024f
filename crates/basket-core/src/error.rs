//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller violated an input contract (empty variant id, negative
    /// price). Rejected before any state change.
    #[error("validation error: {0}")]
    Validation(String),

    /// A storage or serialization failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Infrastructure(format!("snapshot serialization failed: {err}"))
    }
}
