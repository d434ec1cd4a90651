use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Failure inside the hashing layer. Carries the argon2 library's own message
/// and never any secret material.
#[derive(Debug, thiserror::Error)]
#[error("password {operation} failed: {reason}")]
pub struct PasswordError {
    operation: &'static str,
    reason: String,
}

impl PasswordError {
    fn new(operation: &'static str, cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, operation, "argon2 failure");
        Self {
            operation,
            reason: cause.to_string(),
        }
    }
}

/// Derives a PHC-format Argon2 hash with a fresh random salt. The output string
/// carries the algorithm parameters and salt, so verification needs nothing else.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| PasswordError::new("hashing", e))?;
    Ok(hash.to_string())
}

/// Checks a plaintext candidate against a stored PHC string. A malformed
/// stored hash is an error; a mismatching password is `Ok(false)`.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::new("hash parsing", e))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
