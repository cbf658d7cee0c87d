//! Password hashing and verification.
//!
//! Thin wrappers around bcrypt used by registration, login, and password
//! reset. Each hash embeds its own random salt; comparison happens inside
//! the bcrypt crate in constant time.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{DEFAULT_COST, hash, verify};

/// Function to hash a password before storing in database
///
/// # Arguments
/// * `password` - Plain text password to hash
///
/// # Returns
/// Hashed password string
///
/// # Errors
/// Returns `ServiceError` if hashing fails
pub fn hash_password(password: &str) -> ServiceResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| ServiceError::validation(format!("Password hashing failed: {}", e)))
}

/// Function to verify a password against the stored hash
///
/// # Arguments
/// * `password` - Plain text password to verify
/// * `hash` - Stored password hash
///
/// # Returns
/// `true` if password matches hash, `false` otherwise
///
/// # Errors
/// Returns `ServiceError` if verification process fails
pub fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
    verify(password, hash)
        .map_err(|e| ServiceError::validation(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("correct horse battery").unwrap();

        assert!(verify_password("correct horse battery", &digest).unwrap());
        assert!(!verify_password("wrong password", &digest).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("password1").unwrap();
        let second = hash_password("password1").unwrap();

        // Same input, different salt, different digest.
        assert_ne!(first, second);
        assert!(verify_password("password1", &first).unwrap());
        assert!(verify_password("password1", &second).unwrap());
    }

    #[test]
    fn test_digest_is_not_plaintext() {
        let digest = hash_password("password1").unwrap();
        assert!(!digest.contains("password1"));
    }
}
