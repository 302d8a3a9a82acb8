//! La Milagrosa Client: HTTP implementations of the core gateways,
//! persisted token storage and gated access to the resource APIs.
//!
//! This crate provides:
//! - Connection setup ([`ApiConnection`], [`ClientConfig`])
//! - The authentication endpoint client ([`HttpAuthApi`])
//! - Token storage backends ([`MemoryStorage`], [`FileStorage`])
//! - Resource access behind the capability gate ([`ResourceClient`])

mod auth_api;
mod connection;
mod error;
mod resource;
mod storage;

pub use auth_api::HttpAuthApi;
pub use connection::{ApiConnection, ClientConfig};
pub use error::{ClientError, status_error};
pub use resource::{ReportKind, Resource, ResourceClient, WriteOp, account_role};
pub use storage::{FileStorage, MemoryStorage};
