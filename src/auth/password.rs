//! Password hashing
//!
//! Argon2id with a fresh random salt per hash, stored as a PHC string.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("hashing task failed: {0}")]
    Task(String),
}

/// One-way password hashing with constant-time verification
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Returns `false` for a wrong password and for a malformed digest alike
    fn verify(&self, password: &str, digest: &str) -> bool;
}

#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Minimum-cost parameters so tests do not spend seconds hashing
#[cfg(test)]
pub fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(Params::MIN_M_COST, 1, 1).expect("minimum argon2 params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        test_hasher()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let digest = hasher.hash("secret123").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("secret123", &digest));
        assert!(!hasher.verify("secret124", &digest));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same-password", &first));
        assert!(hasher.verify("same-password", &second));
    }

    #[test]
    fn test_malformed_digest_does_not_verify() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("secret123", ""));
        assert!(!hasher.verify("secret123", "not-a-phc-string"));
    }

    #[test]
    fn test_default_parameters_verify_digests_from_other_params() {
        let digest = fast_hasher().hash("secret123").unwrap();
        // Parameters travel inside the PHC string
        assert!(Argon2Hasher::new().verify("secret123", &digest));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        assert!(matches!(
            Argon2Hasher::with_params(0, 0, 0),
            Err(PasswordError::InvalidParams(_))
        ));
    }
}
