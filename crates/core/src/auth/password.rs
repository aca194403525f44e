//! Password hashing with Argon2id.
//!
//! Login accounts store PHC strings produced here; the seeded admin account
//! and every password change go through [`hash_password`].

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors raised while hashing or checking a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Checking failed for a reason other than a wrong password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Stored value is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes `password` with a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use orgkas_core::auth::hash_password;
///
/// let hash = hash_password("rahasia-kas-2025").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks `password` against a stored PHC string.
///
/// A wrong password is `Ok(false)`, not an error.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` for a malformed stored value and
/// `PasswordError::VerifyError` for any other failure.
///
/// # Example
///
/// ```
/// use orgkas_core::auth::{hash_password, verify_password};
///
/// let hash = hash_password("pengurus").unwrap();
/// assert!(verify_password("pengurus", &hash).unwrap());
/// assert!(!verify_password("Pengurus", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::InvalidHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_and_verifies() {
        let hash = hash_password("pengurus-2025").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pengurus-2025"));

        assert!(verify_password("pengurus-2025", &hash).unwrap());
        assert!(!verify_password("pengurus-2024", &hash).unwrap());
    }

    #[test]
    fn test_empty_password_still_hashes() {
        let hash = hash_password("").unwrap();
        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password(" ", &hash).unwrap());
    }

    #[test]
    fn test_salt_differs_per_hash() {
        assert_ne!(hash_password("admin123").unwrap(), hash_password("admin123").unwrap());
    }

    #[test]
    fn test_malformed_stored_hash() {
        assert!(matches!(
            verify_password("admin123", "admin123"),
            Err(PasswordError::InvalidHash)
        ));
    }
}
