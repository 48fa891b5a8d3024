// Password hashing and verification, kept behind a single service so the
// token issuer and access guard stay ignorant of the hashing scheme

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashError)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = PasswordService::hash_password("pw123456").unwrap();
        assert_ne!(hash, "pw123456");
        assert!(PasswordService::verify_password("pw123456", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = PasswordService::hash_password("correct horse").unwrap();
        assert!(!PasswordService::verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        // Random salts mean two hashes of the same input must differ
        let a = PasswordService::hash_password("pw123456").unwrap();
        let b = PasswordService::hash_password("pw123456").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(PasswordService::verify_password("pw", "not-a-phc-string").is_err());
    }
}
