//! One-way password hashing.
//!
//! Argon2id with a per-password random salt; cost parameters are embedded in
//! the PHC string so they can be raised later without invalidating stored
//! hashes. Plaintext is never logged or persisted.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;

/// Hash a plaintext password into a PHC-format string.
///
/// # Errors
/// Returns an error if the hasher fails, which only happens on invalid
/// parameters or exhausted entropy.
pub fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash password"))?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored PHC string.
///
/// Malformed stored hashes verify as false rather than erroring, so a
/// corrupted row degrades to a failed login instead of a 500.
#[must_use]
pub fn verify(plaintext: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() -> Result<()> {
        let stored = hash("Pw1!pantry")?;
        assert!(verify("Pw1!pantry", &stored));
        assert!(!verify("Pw2!pantry", &stored));
        Ok(())
    }

    #[test]
    fn hash_is_never_the_plaintext_and_is_salted() -> Result<()> {
        let first = hash("Pw1!pantry")?;
        let second = hash("Pw1!pantry")?;
        assert_ne!(first, "Pw1!pantry");
        assert!(first.starts_with("$argon2id$"));
        // Different salts produce different hashes for the same password.
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn verify_rejects_malformed_stored_hash() {
        assert!(!verify("whatever", "not-a-phc-string"));
        assert!(!verify("whatever", ""));
    }
}
