//! La Milagrosa Auth: bearer token decoding, role resolution, session
//! lifecycle, capability gating and role-based navigation.

pub mod capability;
pub mod config;
pub mod error;
pub mod navigation;
pub mod role;
pub mod session;
pub mod token;

pub use capability::{Action, authorize, is_allowed};
pub use config::AuthConfig;
pub use error::AuthError;
pub use navigation::{Navigator, default_section, project_sections};
pub use role::resolve_role;
pub use session::SessionStore;
pub use token::Claims;
