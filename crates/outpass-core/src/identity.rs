//! Identity provider seam.
//!
//! Accounts live in two places: the auth provider owns the credential
//! (email + password) and issues the identity handle; the profile store owns
//! everything else. This trait is the provider half, shaped after hosted
//! providers where creating an identity also signs it in and a single
//! ambient identity is "current" at a time.

use uuid::Uuid;

use crate::error::OutpassError;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("email already in use")]
    EmailInUse,
    #[error("password does not meet the minimum length")]
    WeakCredential,
    #[error("email address is malformed")]
    InvalidEmail,
    #[error("no identity for that email")]
    NotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<IdentityError> for OutpassError {
    fn from(err: IdentityError) -> Self {
        OutpassError::Identity {
            reason: err.to_string(),
        }
    }
}

pub trait IdentityProvider: Send + Sync {
    /// Create a credential and return the new identity handle. On success
    /// the new identity becomes the current one.
    fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Uuid, IdentityError>> + Send;
    /// Verify a credential and make its identity current.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Uuid, IdentityError>> + Send;
    /// Clear the current identity. Safe to call when nobody is signed in.
    fn sign_out(&self) -> impl Future<Output = ()> + Send;
    fn current_identity(&self) -> Option<Uuid>;
}
