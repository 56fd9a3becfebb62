//! Error types for futon

use thiserror::Error;

/// Result type alias for futon operations
pub type Result<T> = std::result::Result<T, FutonError>;

/// Unified error type for all futon operations
#[derive(Error, Debug, Clone)]
pub enum FutonError {
    /// A document failed its own `validate` hook; no network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation required server-assigned identity the document does not have
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The server rejected the operation with `{ok: false, error, reason}`
    #[error("{error}: {reason}")]
    Remote { error: String, reason: String },

    /// Network or connection failure, surfaced from the transport layer
    #[error("Transport error: {0}")]
    Transport(String),

    /// A request or response body could not be encoded/decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FutonError {
    /// Returns true if the error originated on the remote server
    pub fn is_remote(&self) -> bool {
        matches!(self, FutonError::Remote { .. })
    }

    /// Returns true if the error was raised before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            FutonError::Validation(_) | FutonError::InvalidState(_)
        )
    }
}

impl From<serde_json::Error> for FutonError {
    fn from(err: serde_json::Error) -> Self {
        FutonError::Serialization(err.to_string())
    }
}
