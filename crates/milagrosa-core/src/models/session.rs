//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// The signed-in identity as derived from the bearer token.
///
/// A session is never authoritative on its own: it is rebuilt from the
/// token every time the store loads or logs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Token subject (the account e-mail).
    pub identity: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}
