//! Argon2id hashing for link passwords.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde_json::json;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hash error: {0}")]
    Hash(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "Password processing failed");
        AppError::internal("Failed to process password", json!({}))
    }
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verifies `password` against a PHC hash string in constant time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash for a new link: empty or absent means unprotected.
pub fn process_new_password(password: Option<&str>) -> Result<Option<String>, PasswordError> {
    match password {
        Some(p) if !p.is_empty() => hash_password(p).map(Some),
        _ => Ok(None),
    }
}

/// Password change for an update.
///
/// `None` leaves the link untouched, `Some("")` removes protection and any
/// other value replaces the hash.
pub fn process_update_password(
    password: Option<&str>,
) -> Result<Option<Option<String>>, PasswordError> {
    match password {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(p) => hash_password(p).map(|h| Some(Some(h))),
    }
}
