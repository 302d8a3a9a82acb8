//! User account models.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login credentials. Held only for the duration of the login request.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload for self-service account registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(custom(function = "not_blank", message = "Name is mandatory"))]
    pub name: String,
    #[validate(email(message = "Email is not well formatted"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password should be 8 characters long minimum"))]
    pub password: String,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// A user account as listed by the back-office `users` endpoint.
///
/// `roles` holds the raw role names exactly as the server sent them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    #[serde(rename = "nombre", alias = "name", default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}
