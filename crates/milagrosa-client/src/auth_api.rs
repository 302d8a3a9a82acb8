//! HTTP implementation of [`AuthApi`].

use milagrosa_core::error::{MilagrosaError, MilagrosaResult};
use milagrosa_core::gateway::{AuthApi, AuthResponse};
use milagrosa_core::models::user::{Credentials, RegistrationRequest};
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::connection::ApiConnection;
use crate::error::ClientError;

const AUTHENTICATE_PATH: &str = "auth/authenticate";
const REGISTER_PATH: &str = "auth/register";

/// Auth endpoints of the REST backend.
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    conn: ApiConnection,
}

impl HttpAuthApi {
    pub fn new(conn: ApiConnection) -> Self {
        Self { conn }
    }
}

impl AuthApi for HttpAuthApi {
    async fn authenticate(&self, credentials: &Credentials) -> MilagrosaResult<AuthResponse> {
        let resp = self
            .conn
            .request(Method::POST, AUTHENTICATE_PATH)
            .json(credentials)
            .send()
            .await
            .map_err(ClientError::from)?;

        let status = resp.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(MilagrosaError::AuthenticationFailed {
                reason: "invalid credentials".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST {
                debug!(identity = %credentials.email, body = %body, "credentials refused by validation");
                return Err(MilagrosaError::AuthenticationFailed {
                    reason: format!("invalid credentials: {}", body.trim()),
                });
            }
            return Err(ClientError::Status { status, body }.into());
        }

        let auth: AuthResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        if auth.token.trim().is_empty() {
            warn!(identity = %credentials.email, "authenticate returned no token");
            return Err(MilagrosaError::AuthenticationFailed {
                reason: "no token in response".into(),
            });
        }
        Ok(auth)
    }

    async fn register(&self, request: &RegistrationRequest) -> MilagrosaResult<bool> {
        let resp = self
            .conn
            .request(Method::POST, REGISTER_PATH)
            .json(request)
            .send()
            .await
            .map_err(ClientError::from)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(true);
        }
        let body = resp.text().await.unwrap_or_default();
        if status.is_client_error() {
            debug!(identity = %request.email, %status, body = %body, "registration refused");
            return Ok(false);
        }
        Err(ClientError::Status { status, body }.into())
    }
}
