// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Salted one-way password hashing with Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Longest accepted password, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 1024;

// =============================================================================
// PasswordConfig
// =============================================================================

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordConfig {
    /// Minimal cost parameters. Only suitable for tests.
    pub fn fast_insecure() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }
}

// =============================================================================
// PasswordHasher
// =============================================================================

/// Hashes and verifies passwords.
///
/// Every call to [`hash`](Self::hash) draws a fresh salt from the OS RNG, so
/// the same plaintext never produces the same digest twice.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a hasher with the given cost parameters.
    pub fn new(config: &PasswordConfig) -> AuthResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AuthError::internal(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a plaintext password into a PHC string.
    pub fn hash(&self, plaintext: &str) -> AuthResult<String> {
        check_length(plaintext)?;

        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::internal(format!("Failed to hash password: {}", e)))
    }

    /// Returns `true` iff `plaintext` is the password `digest` was made from.
    ///
    /// A digest that does not parse is treated as a mismatch.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .finish()
    }
}

fn check_length(plaintext: &str) -> AuthResult<()> {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig::fast_insecure()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let digest = hasher.hash("pw123").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("pw123", &digest));
        assert!(!hasher.verify("pw124", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn test_salt_is_fresh_per_hash() {
        let hasher = hasher();
        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same-password", &first));
        assert!(hasher.verify("same-password", &second));
    }

    #[test]
    fn test_garbage_digest_does_not_verify() {
        assert!(!hasher().verify("pw123", "not-a-phc-string"));
    }

    #[test]
    fn test_overlong_password_rejected() {
        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
        let err = hasher().hash(&long).unwrap_err();
        assert!(matches!(err, AuthError::Validation { .. }));
    }

    #[test]
    fn test_default_config_builds() {
        assert!(PasswordHasher::new(&PasswordConfig::default()).is_ok());
    }
}
