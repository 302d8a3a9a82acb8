//! Error types for the La Milagrosa client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MilagrosaError {
    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("Token carries no usable role claim")]
    NoAuthorities,

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Permission denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Entity not found: {entity}")]
    NotFound { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MilagrosaError {
    /// Whether the error means the current session can no longer be used.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            MilagrosaError::InvalidToken { .. }
                | MilagrosaError::NoAuthorities
                | MilagrosaError::SessionExpired
        )
    }
}

pub type MilagrosaResult<T> = Result<T, MilagrosaError>;
