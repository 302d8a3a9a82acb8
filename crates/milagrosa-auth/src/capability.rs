//! Role-based capability checks.
//!
//! Every "may this role do X" question in the client is answered here.
//! Answers are advisory: they decide what to render and which requests
//! to send, while the server remains the enforcer for every call.

use std::fmt;

use milagrosa_core::models::role::Role;

use crate::error::AuthError;

/// A user-facing action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewAdminNav,
    /// Create, edit or delete categories, products and inventory.
    ManageCatalog,
    ManageProviders,
    ManageUsers,
    /// Edit, delete or place purchase orders and edit customer orders.
    ManageOrders,
    ApproveOrders,
    ViewReports,
    AccessCart,
    PlaceOrder,
    DeleteUser { target: Role, is_self: bool },
    PromoteToAdmin { target: Role, is_self: bool },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ViewAdminNav => f.write_str("viewing the admin panel"),
            Action::ManageCatalog => f.write_str("managing the catalog"),
            Action::ManageProviders => f.write_str("managing providers"),
            Action::ManageUsers => f.write_str("managing users"),
            Action::ManageOrders => f.write_str("managing orders"),
            Action::ApproveOrders => f.write_str("approving orders"),
            Action::ViewReports => f.write_str("viewing reports"),
            Action::AccessCart => f.write_str("using the cart"),
            Action::PlaceOrder => f.write_str("placing orders"),
            Action::DeleteUser { target, is_self } => {
                if *is_self {
                    f.write_str("deleting your own account")
                } else {
                    write!(f, "deleting a {target} account")
                }
            }
            Action::PromoteToAdmin { target, is_self } => {
                if *is_self {
                    f.write_str("promoting yourself")
                } else {
                    write!(f, "promoting a {target} account to ADMIN")
                }
            }
        }
    }
}

pub fn can_view_admin_nav(role: Role) -> bool {
    role.is_staff()
}

pub fn can_manage_catalog(role: Role) -> bool {
    role.is_staff()
}

pub fn can_manage_providers(role: Role) -> bool {
    role.is_staff()
}

pub fn can_manage_users(role: Role) -> bool {
    role.is_staff()
}

pub fn can_manage_orders(role: Role) -> bool {
    role.is_staff()
}

pub fn can_approve_orders(role: Role) -> bool {
    role.is_staff()
}

pub fn can_view_reports(role: Role) -> bool {
    role.is_staff()
}

/// The cart belongs to retail customers only.
pub fn can_access_cart(role: Role) -> bool {
    role == Role::User
}

pub fn can_place_order(role: Role) -> bool {
    role == Role::User
}

/// Nobody deletes their own account, and an employee never deletes an
/// admin.
pub fn can_delete_user(acting: Role, target: Role, is_acting_on_self: bool) -> bool {
    if is_acting_on_self {
        return false;
    }
    match acting {
        Role::Admin => true,
        Role::Employee => target != Role::Admin,
        Role::User => false,
    }
}

/// Only an admin promotes, never themselves, and never someone who is
/// already an admin.
pub fn can_promote_to_admin(acting: Role, target: Role, is_acting_on_self: bool) -> bool {
    acting == Role::Admin && target != Role::Admin && !is_acting_on_self
}

pub fn is_allowed(role: Role, action: Action) -> bool {
    match action {
        Action::ViewAdminNav => can_view_admin_nav(role),
        Action::ManageCatalog => can_manage_catalog(role),
        Action::ManageProviders => can_manage_providers(role),
        Action::ManageUsers => can_manage_users(role),
        Action::ManageOrders => can_manage_orders(role),
        Action::ApproveOrders => can_approve_orders(role),
        Action::ViewReports => can_view_reports(role),
        Action::AccessCart => can_access_cart(role),
        Action::PlaceOrder => can_place_order(role),
        Action::DeleteUser { target, is_self } => can_delete_user(role, target, is_self),
        Action::PromoteToAdmin { target, is_self } => {
            can_promote_to_admin(role, target, is_self)
        }
    }
}

/// [`is_allowed`] as a `Result`, for use before dispatching a request.
pub fn authorize(role: Role, action: Action) -> Result<(), AuthError> {
    if is_allowed(role, action) {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            role: role.to_string(),
            action: action.to_string(),
        })
    }
}
