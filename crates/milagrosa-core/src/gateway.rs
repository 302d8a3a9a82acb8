//! Trait definitions for the external collaborators the client talks to.
//!
//! The session store is generic over these so the auth layer has no
//! dependency on HTTP or on any particular storage backend.

use serde::{Deserialize, Serialize};

use crate::error::MilagrosaResult;
use crate::models::user::{Credentials, RegistrationRequest};

/// Successful response of the authenticate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Auth API
// ---------------------------------------------------------------------------

pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// Bad credentials surface as `MilagrosaError::AuthenticationFailed`.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = MilagrosaResult<AuthResponse>> + Send;

    /// Create a new customer account. `Ok(false)` means the server
    /// refused the registration (e.g. the e-mail is taken).
    fn register(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = MilagrosaResult<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Persisted storage
// ---------------------------------------------------------------------------

/// Key-value string storage that survives restarts.
///
/// Only the session store writes to it.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> MilagrosaResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> MilagrosaResult<()>;
    fn remove(&self, key: &str) -> MilagrosaResult<()>;
}

impl<T: TokenStorage + ?Sized> TokenStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> MilagrosaResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> MilagrosaResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> MilagrosaResult<()> {
        (**self).remove(key)
    }
}

impl<T: AuthApi> AuthApi for std::sync::Arc<T> {
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = MilagrosaResult<AuthResponse>> + Send {
        (**self).authenticate(credentials)
    }

    fn register(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = MilagrosaResult<bool>> + Send {
        (**self).register(request)
    }
}
