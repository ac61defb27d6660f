//! Password hashing and verification using Argon2
//!
//! Uses the argon2id variant with default parameters. Hashes are PHC strings
//! carrying their own salt and parameters, so they are opaque to the rest of
//! the crate.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::debug;

use crate::types::WicketError;

/// Hash a password using Argon2id
///
/// Returns the PHC-formatted hash string that includes the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, WicketError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| WicketError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash
///
/// A malformed stored hash verifies as false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(e) => {
            debug!("Stored password hash is not a valid PHC string: {e}");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// [`hash_password`] on the blocking pool
pub async fn spawn_hash(password: String) -> Result<String, WicketError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool
pub async fn spawn_verify(password: String, hash: String) -> Result<bool, WicketError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?)
}
