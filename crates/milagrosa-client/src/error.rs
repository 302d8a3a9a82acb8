//! Client-side error types and HTTP status translation.

use milagrosa_core::error::MilagrosaError;
use reqwest::StatusCode;

/// Transport-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::Decode(_) => None,
        }
    }
}

impl From<ClientError> for MilagrosaError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Decode(msg) => MilagrosaError::Internal(msg),
            other => MilagrosaError::Transport(other.to_string()),
        }
    }
}

/// Translate a non-success resource response into the error taxonomy.
///
/// 401 and 403 are kept distinct: the first ends the session, the second
/// only tells the user they lack permission.
pub fn status_error(status: StatusCode, body: String, entity: &str) -> MilagrosaError {
    match status {
        StatusCode::UNAUTHORIZED => MilagrosaError::SessionExpired,
        StatusCode::FORBIDDEN => MilagrosaError::AuthorizationDenied {
            reason: format!("you do not have permission to access {entity}"),
        },
        StatusCode::NOT_FOUND => MilagrosaError::NotFound {
            entity: entity.to_string(),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            MilagrosaError::Validation { message: body }
        }
        _ => ClientError::Status { status, body }.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_session_expired() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new(), "users"),
            MilagrosaError::SessionExpired
        ));
    }

    #[test]
    fn forbidden_is_authorization_denied() {
        let err = status_error(StatusCode::FORBIDDEN, String::new(), "users");
        match err {
            MilagrosaError::AuthorizationDenied { reason } => assert!(reason.contains("users")),
            other => panic!("expected AuthorizationDenied, got {other:?}"),
        }
    }

    #[test]
    fn not_found_names_entity() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, String::new(), "users/9"),
            MilagrosaError::NotFound { entity } if entity == "users/9"
        ));
    }

    #[test]
    fn bad_request_carries_body() {
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "IVA must be >= 0".into(), "order"),
            MilagrosaError::Validation { message } if message.contains("IVA")
        ));
    }

    #[test]
    fn server_errors_are_transport() {
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into(), "products"),
            MilagrosaError::Transport(msg) if msg.contains("500")
        ));
    }
}
