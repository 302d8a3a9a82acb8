//! Role-based navigation: which sections a session may open, and which
//! one is active.

use milagrosa_core::models::role::Role;
use milagrosa_core::models::section::Section;
use tracing::debug;

use crate::error::AuthError;

/// Back-office sections, in menu order.
pub const STAFF_SECTIONS: [Section; 8] = [
    Section::Sales,
    Section::Catalog,
    Section::Categories,
    Section::Users,
    Section::Orders,
    Section::Providers,
    Section::StockAlerts,
    Section::Reports,
];

/// Storefront sections, in menu order.
pub const CUSTOMER_SECTIONS: [Section; 3] = [Section::Catalog, Section::Profile, Section::MyOrders];

/// Ordered sections permitted for `role`.
pub fn project_sections(role: Role) -> &'static [Section] {
    if role.is_staff() {
        &STAFF_SECTIONS
    } else {
        &CUSTOMER_SECTIONS
    }
}

/// Section opened when a session starts.
pub fn default_section(role: Role) -> Section {
    if role.is_staff() {
        Section::Sales
    } else {
        Section::Catalog
    }
}

/// Active-section state for one session.
///
/// The active section is derived from the role once, at construction;
/// afterwards only [`Navigator::navigate`] changes it.
#[derive(Debug, Clone)]
pub struct Navigator {
    role: Role,
    active: Section,
}

impl Navigator {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            active: default_section(role),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn active(&self) -> Section {
        self.active
    }

    pub fn sections(&self) -> &'static [Section] {
        project_sections(self.role)
    }

    /// Switch to `section` if the role may open it.
    pub fn navigate(&mut self, section: Section) -> Result<Section, AuthError> {
        if !self.sections().contains(&section) {
            return Err(AuthError::Forbidden {
                role: self.role.to_string(),
                action: format!("opening section {section}"),
            });
        }
        debug!(from = %self.active, to = %section, "navigate");
        self.active = section;
        Ok(section)
    }
}
