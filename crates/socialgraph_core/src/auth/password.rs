//! One-way password hashing.
//!
//! # Responsibility
//! - Hash raw passwords with a per-password random salt (Argon2id, PHC
//!   string format).
//! - Verify a raw password against a stored hash.
//!
//! # Invariants
//! - Raw passwords are never stored, returned or logged.
//! - Verification reads cost parameters from the stored hash, so hashes
//!   written under older settings keep verifying.
//! - `verify` never errors: an unparsable stored hash is a mismatch.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasherConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordHasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHasherConfig {
    /// Minimal-cost parameters for tests and local tooling.
    pub fn low_cost() -> Self {
        Self {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Hashing error. Only raised on the write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    InvalidParams(String),
    HashFailed(String),
}

impl Display for PasswordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParams(message) => write!(f, "invalid password hasher params: {message}"),
            Self::HashFailed(message) => write!(f, "password hashing failed: {message}"),
        }
    }
}

impl Error for PasswordError {}

/// Salted one-way hasher for account passwords.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Built once in `new`; clones share it.
    decoy_hash: Arc<str>,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Creates a hasher with validated cost parameters.
    ///
    /// Also hashes the decoy used by `verify_decoy`, so the unknown-account
    /// path never pays for a hash at login time.
    pub fn new(config: PasswordHasherConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|err| PasswordError::InvalidParams(err.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_hash = hash_with(&argon2, DECOY_PASSWORD)?;
        Ok(Self {
            argon2,
            decoy_hash: Arc::from(decoy_hash),
        })
    }

    /// Hashes `raw` with a fresh random salt.
    pub fn hash(&self, raw: &str) -> Result<String, PasswordError> {
        hash_with(&self.argon2, raw)
    }

    /// Returns whether `raw` matches `stored_hash`.
    pub fn verify(&self, raw: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(raw.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Burns one verification against a throwaway hash.
    ///
    /// Used when no account matched, so a missing username costs one
    /// verify, the same as a wrong password.
    pub fn verify_decoy(&self, raw: &str) {
        let _ = self.verify(raw, &self.decoy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, raw: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::HashFailed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{CredentialHasher, PasswordError, PasswordHasherConfig, DECOY_PASSWORD};
    use std::sync::Arc;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(PasswordHasherConfig::low_cost()).expect("low-cost params")
    }

    #[test]
    fn hash_is_salted_and_verifies() {
        let hasher = hasher();
        let first = hasher.hash("correct horse").unwrap();
        let second = hasher.hash("correct horse").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("correct horse"));
        assert!(hasher.verify("correct horse", &first));
        assert!(hasher.verify("correct horse", &second));
        assert!(!hasher.verify("battery staple", &first));
    }

    #[test]
    fn decoy_is_hashed_once_and_shared_by_clones() {
        let hasher = hasher();
        let clone = hasher.clone();
        assert!(Arc::ptr_eq(&hasher.decoy_hash, &clone.decoy_hash));

        let before = Arc::clone(&clone.decoy_hash);
        clone.verify_decoy("ghost-password");
        clone.verify_decoy("ghost-password");
        assert!(Arc::ptr_eq(&before, &clone.decoy_hash));

        assert!(hasher.decoy_hash.starts_with("$argon2id$"));
        assert!(hasher.verify(DECOY_PASSWORD, &hasher.decoy_hash));
        assert!(!hasher.verify("ghost-password", &hasher.decoy_hash));
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        assert!(!hasher().verify("anything", "not-a-phc-string"));
        assert!(!hasher().verify("anything", ""));
    }

    #[test]
    fn verification_uses_parameters_from_stored_hash() {
        let stored = hasher().hash("s3cret-pass").unwrap();
        let stronger = CredentialHasher::new(PasswordHasherConfig {
            memory_kib: 512,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(stronger.verify("s3cret-pass", &stored));
    }

    #[test]
    fn rejects_invalid_params() {
        let err = CredentialHasher::new(PasswordHasherConfig {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, PasswordError::InvalidParams(_)));
    }
}
