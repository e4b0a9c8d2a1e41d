//! SurrealDB-backed identity provider.
//!
//! Stands in for a hosted auth provider: credentials live in their own
//! `credential` table, identity handles are UUIDs, and one ambient identity
//! is signed in at a time (creating an identity also signs it in, the way
//! provider SDKs behave).
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use std::sync::{Arc, RwLock};

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use outpass_core::identity::{IdentityError, IdentityProvider};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

/// Minimum password length the provider itself enforces, independent of
/// any stricter policy upstream.
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, SurrealValue)]
struct CredentialRow {
    record_id: String,
    password_hash: String,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, IdentityError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| IdentityError::Provider(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| IdentityError::Provider(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, IdentityError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| IdentityError::Provider(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(IdentityError::Provider(format!("verify error: {e}"))),
    }
}

/// Loose shape check only; deliverability is the provider's problem in
/// hosted setups and out of scope here.
fn plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

/// SurrealDB implementation of the identity provider.
#[derive(Clone)]
pub struct SurrealIdentityProvider<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
    /// The ambient signed-in identity, shared across clones.
    current: Arc<RwLock<Option<Uuid>>>,
}

impl<C: Connection> SurrealIdentityProvider<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            pepper: None,
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
            current: Arc::new(RwLock::new(None)),
        }
    }

    fn set_current(&self, id: Option<Uuid>) {
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = id;
    }
}

impl<C: Connection> IdentityProvider for SurrealIdentityProvider<C> {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        if !plausible_email(email) {
            return Err(IdentityError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(IdentityError::WeakCredential);
        }

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM credential \
                 WHERE email = $email GROUP ALL",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;
        let rows: Vec<CountRow> = result
            .take(0)
            .map_err(|e| IdentityError::Provider(e.to_string()))?;
        if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(IdentityError::EmailInUse);
        }

        let id = Uuid::new_v4();
        let password_hash = hash_password(password, self.pepper.as_deref())?;

        self.db
            .query(
                "CREATE type::record('credential', $id) SET \
                 email = $email, password_hash = $password_hash",
            )
            .bind(("id", id.to_string()))
            .bind(("email", email.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?
            .check()
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        self.set_current(Some(id));
        Ok(id)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        if !plausible_email(email) {
            return Err(IdentityError::InvalidEmail);
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, password_hash \
                 FROM credential WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        let rows: Vec<CredentialRow> = result
            .take(0)
            .map_err(|e| IdentityError::Provider(e.to_string()))?;
        let row = rows.into_iter().next().ok_or(IdentityError::NotFound)?;

        if !verify_password(password, &row.password_hash, self.pepper.as_deref())? {
            return Err(IdentityError::WrongPassword);
        }

        let id = Uuid::parse_str(&row.record_id)
            .map_err(|e| IdentityError::Provider(format!("invalid credential UUID: {e}")))?;

        self.set_current(Some(id));
        Ok(id)
    }

    async fn sign_out(&self) {
        self.set_current(None);
    }

    fn current_identity(&self) -> Option<Uuid> {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}
