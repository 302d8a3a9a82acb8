//! Session configuration.

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Upper bound on a login round-trip in seconds (default: 10).
    /// Expiry is reported as a failed login.
    pub login_timeout_secs: u64,
    /// Reject tokens whose `exp` claim is in the past (default: true).
    pub enforce_expiry: bool,
    /// Clock skew tolerated when checking `exp`, in seconds (default: 30).
    pub expiry_leeway_secs: i64,
    /// Storage key holding the bearer token.
    pub token_key: String,
    /// Storage key holding the cached display copy of the session.
    pub session_key: String,
    /// Storage key holding the signed-in e-mail.
    pub email_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_timeout_secs: 10,
            enforce_expiry: true,
            expiry_leeway_secs: 30,
            token_key: "authToken".into(),
            session_key: "currentUser".into(),
            email_key: "userEmail".into(),
        }
    }
}
