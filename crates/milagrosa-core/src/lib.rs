//! La Milagrosa core: domain types shared by the auth, client and CLI
//! crates.
//!
//! - Error taxonomy ([`MilagrosaError`], [`MilagrosaResult`])
//! - Domain models ([`models`])
//! - Traits for the external collaborators ([`gateway`])

pub mod error;
pub mod gateway;
pub mod models;

pub use error::{MilagrosaError, MilagrosaResult};
pub use gateway::{AuthApi, AuthResponse, TokenStorage};
