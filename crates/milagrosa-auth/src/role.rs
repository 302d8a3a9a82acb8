//! Reduction of raw authority strings to a single [`Role`].
//!
//! This is the only place raw authority strings are interpreted. Every
//! other component works with the resolved [`Role`].

use milagrosa_core::models::role::Role;
use tracing::warn;

use crate::error::AuthError;

const ROLE_PREFIX: &str = "ROLE_";

/// Strip an optional `ROLE_` prefix (any case) and upper-case the rest.
pub fn normalize_authority(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    match upper.strip_prefix(ROLE_PREFIX) {
        Some(rest) => rest.to_string(),
        None => upper,
    }
}

/// Resolve a set of authorities to one role by fixed precedence
/// ADMIN > EMPLOYEE > USER.
///
/// An empty (or all-blank) set fails with [`AuthError::NoAuthorities`].
/// A set with no recognised name resolves to [`Role::User`], never to
/// a staff role.
pub fn resolve_role<S: AsRef<str>>(authorities: &[S]) -> Result<Role, AuthError> {
    let normalized: Vec<String> = authorities
        .iter()
        .map(|a| a.as_ref())
        .filter(|a| !a.trim().is_empty())
        .map(normalize_authority)
        .collect();

    if normalized.is_empty() {
        return Err(AuthError::NoAuthorities);
    }

    let has = |name: &str| normalized.iter().any(|a| a == name);
    if has("ADMIN") {
        Ok(Role::Admin)
    } else if has("EMPLOYEE") {
        Ok(Role::Employee)
    } else if has("USER") {
        Ok(Role::User)
    } else {
        warn!(authorities = ?normalized, "no recognised role, falling back to USER");
        Ok(Role::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_prefix_and_case() {
        assert_eq!(normalize_authority("ROLE_ADMIN"), "ADMIN");
        assert_eq!(normalize_authority("role_employee"), "EMPLOYEE");
        assert_eq!(normalize_authority(" user "), "USER");
        assert_eq!(normalize_authority("ADMIN"), "ADMIN");
    }

    #[test]
    fn admin_wins_regardless_of_position_or_spelling() {
        let spellings = ["ADMIN", "admin", "ROLE_ADMIN", "Role_Admin", "rOlE_aDmIn"];
        for admin in spellings {
            for others in [vec![], vec!["EMPLOYEE"], vec!["USER", "ROLE_EMPLOYEE"], vec!["GUEST"]] {
                let mut before = others.clone();
                before.insert(0, admin);
                let mut after = others.clone();
                after.push(admin);
                assert_eq!(resolve_role(&before).unwrap(), Role::Admin, "{before:?}");
                assert_eq!(resolve_role(&after).unwrap(), Role::Admin, "{after:?}");
            }
        }
    }

    #[test]
    fn employee_without_admin() {
        for set in [
            vec!["EMPLOYEE"],
            vec!["ROLE_EMPLOYEE", "ROLE_USER"],
            vec!["user", "employee"],
            vec!["OTHER", "Role_Employee"],
        ] {
            assert_eq!(resolve_role(&set).unwrap(), Role::Employee, "{set:?}");
        }
    }

    #[test]
    fn user_only() {
        assert_eq!(resolve_role(&["ROLE_USER"]).unwrap(), Role::User);
    }

    #[test]
    fn empty_set_is_an_error() {
        let none: [&str; 0] = [];
        assert!(matches!(resolve_role(&none), Err(AuthError::NoAuthorities)));
        assert!(matches!(resolve_role(&["", "  "]), Err(AuthError::NoAuthorities)));
    }

    #[test]
    fn unknown_authorities_do_not_grant_staff() {
        assert_eq!(resolve_role(&["ROLE_SUPERVISOR"]).unwrap(), Role::User);
        assert_eq!(resolve_role(&["ROLE_"]).unwrap(), Role::User);
    }

    #[test]
    fn accepts_owned_strings() {
        let owned = vec!["ROLE_EMPLOYEE".to_string()];
        assert_eq!(resolve_role(&owned).unwrap(), Role::Employee);
    }
}
