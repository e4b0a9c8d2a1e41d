//! Error types for the outpass system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutpassError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Identity provider error: {reason}")]
    Identity { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OutpassResult<T> = Result<T, OutpassError>;
