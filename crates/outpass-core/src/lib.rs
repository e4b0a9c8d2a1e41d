//! Outpass core — domain models, repository traits and shared errors for
//! the gate-pass tracker.
//!
//! This crate has no storage or provider dependencies; `outpass-db`
//! implements the traits over SurrealDB and `outpass-flow` builds the
//! onboarding and gate-pass workflows on top of them.

pub mod error;
pub mod identity;
pub mod models;
pub mod repository;

pub use error::{OutpassError, OutpassResult};
