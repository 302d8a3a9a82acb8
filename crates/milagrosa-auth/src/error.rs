//! Authentication error types.

use milagrosa_core::error::MilagrosaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token has expired")]
    TokenExpired,

    #[error("token carries no authorities")]
    NoAuthorities,

    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("a login is already in progress")]
    LoginInProgress,

    #[error("login response superseded by a newer session change")]
    Superseded,

    #[error("login timed out after {0}s")]
    Timeout(u64),

    #[error("{action} is not permitted for role {role}")]
    Forbidden { role: String, action: String },
}

impl From<AuthError> for MilagrosaError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenInvalid(reason) => MilagrosaError::InvalidToken { reason },
            AuthError::TokenExpired => MilagrosaError::SessionExpired,
            AuthError::NoAuthorities => MilagrosaError::NoAuthorities,
            AuthError::InvalidRegistration(message) => MilagrosaError::Validation { message },
            AuthError::LoginInProgress | AuthError::Superseded => {
                MilagrosaError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::Timeout(secs) => MilagrosaError::Timeout { secs },
            AuthError::Forbidden { .. } => MilagrosaError::AuthorizationDenied {
                reason: err.to_string(),
            },
        }
    }
}
