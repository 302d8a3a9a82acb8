//! Normalized role model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The one role a session acts under, after precedence resolution.
///
/// Raw authority strings from the server are never compared directly;
/// they are reduced to this enum by the role resolver in `milagrosa-auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Employee,
    /// A retail customer.
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Employee, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Employee => "EMPLOYEE",
            Role::User => "USER",
        }
    }

    /// Admins and employees share the back-office.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
