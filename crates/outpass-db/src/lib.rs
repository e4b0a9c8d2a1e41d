//! Outpass database — SurrealDB connection management, identity provider
//! and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The credential-backed identity provider ([`SurrealIdentityProvider`])
//! - Implementations of the `outpass-core` repository traits
//! - Error types ([`DbError`])

mod connection;
mod error;
mod identity;
mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use identity::SurrealIdentityProvider;
pub use repository::{
    SurrealAuditLogRepository, SurrealComplaintRepository, SurrealGatePassRepository,
    SurrealProfileRepository, SurrealSystemRepository,
};
pub use schema::{run_migrations, schema_v1};
