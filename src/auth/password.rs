//! Password hashing and verification using Argon2
//!
//! Stored hashes are PHC strings, so salt and parameters travel with them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::types::GreenpointError;

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, GreenpointError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| GreenpointError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash
///
/// A mismatch is `Ok(false)`. An unparseable stored hash is an internal error,
/// not an authentication failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, GreenpointError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| GreenpointError::Internal(format!("Stored password hash is corrupt: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
