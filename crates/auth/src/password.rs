//! Password hashing boundary.
//!
//! The orchestrator only sees the [`PasswordHasher`] trait; the bundled
//! implementation uses Argon2id with a configurable work factor. Comparison
//! is constant-time inside the `argon2` crate.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("password hashing failure: {0}")]
pub struct PasswordHashError(pub String);

/// One-way hash with verification.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError>;

    /// `Ok(true)` on match, `Ok(false)` on mismatch, `Err` on a malformed
    /// stored digest.
    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordHashError>;
}

/// Argon2id hasher in PHC string format.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Build a hasher with an explicit work factor.
    pub fn new(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordHashError(format!("invalid argon2 params: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        argon2::PasswordHasher::hash_password(&self.argon2(), plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordHashError(format!("hash error: {e}")))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| PasswordHashError(format!("invalid hash format: {e}")))?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordHashError(format!("verify error: {e}"))),
        }
    }
}
