// ABOUTME: One-way hashing and verification for user passwords and client secrets
// ABOUTME: bcrypt wrapper that keeps "wrong password" distinct from "corrupt stored hash"
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use thiserror::Error;

/// bcrypt work factor; adaptive cost tuned for interactive logins
const BCRYPT_COST: u32 = 10;

/// Password hashing failure modes
///
/// Callers map `Mismatch` to Unauthenticated and `Hash` to Internal; a stored
/// hash bcrypt cannot parse means corruption, not a wrong password, and
/// conflating the two would hide it.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The plaintext does not match the stored hash
    #[error("password mismatch")]
    Mismatch,
    /// The KDF itself failed (bad cost, malformed stored hash, RNG failure)
    #[error("password hashing failed")]
    Hash(#[source] bcrypt::BcryptError),
}

/// Adaptive-cost password hasher
///
/// bcrypt is CPU-bound; async callers run these methods on a blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: BCRYPT_COST }
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext credential for storage
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::Hash`] only on catastrophic KDF failure.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        bcrypt::hash(plaintext, self.cost).map_err(PasswordError::Hash)
    }

    /// Verify a plaintext credential against a stored hash
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::Mismatch`] when the credential is wrong and
    /// [`PasswordError::Hash`] when the stored hash is structurally invalid.
    pub fn verify(&self, hashed: &str, plaintext: &str) -> Result<(), PasswordError> {
        match bcrypt::verify(plaintext, hashed) {
            Ok(true) => Ok(()),
            Ok(false) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Hash(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_the_plaintext_and_verifies() {
        let hasher = PasswordHasher::new();
        let hashed = hasher.hash("correctpw1").unwrap();

        assert_ne!(hashed, "correctpw1");
        hasher.verify(&hashed, "correctpw1").unwrap();
    }

    #[test]
    fn wrong_password_is_a_mismatch_not_an_error() {
        let hasher = PasswordHasher::new();
        let hashed = hasher.hash("correctpw1").unwrap();

        assert!(matches!(
            hasher.verify(&hashed, "wrongpw99"),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn corrupt_stored_hash_is_an_error_not_a_mismatch() {
        let hasher = PasswordHasher::new();

        assert!(matches!(
            hasher.verify("not-a-bcrypt-hash", "correctpw1"),
            Err(PasswordError::Hash(_))
        ));
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash("correctpw1").unwrap();
        let b = hasher.hash("correctpw1").unwrap();

        assert_ne!(a, b);
    }
}
