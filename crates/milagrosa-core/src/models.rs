//! Domain models for the La Milagrosa client.
//!
//! These are the types shared across all crates. Catalog entities the
//! client only passes through (products, categories, providers,
//! inventory) stay as `serde_json::Value`.

pub mod order;
pub mod role;
pub mod section;
pub mod session;
pub mod user;
