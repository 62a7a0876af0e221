// src/core/identity/password.rs

//! Credential hashing and the password-strength policy.
//!
//! Stored credentials are argon2 PHC strings with per-hash random salts;
//! a password is only ever verified against its hash, never recovered.

use crate::core::CadenzaError;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashes a plaintext password into a PHC-formatted credential string.
pub fn hash_password(password: &str) -> Result<String, CadenzaError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CadenzaError::PasswordHash(e.to_string()))
}

/// Verifies a plaintext password against a stored credential string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CadenzaError> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| CadenzaError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Strength policy: at least 8 characters including at least one uppercase
/// letter, one lowercase letter and one digit.
pub fn is_strong(password: &str) -> bool {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return false;
    }
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    has_uppercase && has_lowercase && has_digit
}
