//! Domain models for outpass.
//!
//! These are the core types shared across all crates.

pub mod audit;
pub mod complaint;
pub mod gatepass;
pub mod profile;
pub mod system;
