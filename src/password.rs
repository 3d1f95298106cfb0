//! Argon2id password hashing.
//!
//! Hashes are PHC strings, so parameters and salt travel with the hash.

use anyhow::{anyhow, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use std::sync::OnceLock;
use tracing::error;

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Hash `password` with a fresh random salt.
///
/// # Errors
/// Returns an error if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Constant-time check of `password` against a stored PHC hash.
///
/// A malformed stored hash is logged and treated as a mismatch.
#[must_use]
pub fn verify_password(hash: &str, password: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("Stored password hash is malformed: {err}");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Burn the same work as a real verification. Used when the email is unknown
/// so response timing does not reveal which accounts exist.
pub fn verify_dummy(password: &str) {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("gatehouse-dummy-password").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(hash, password);
    }
}
