/// Password hashing and verification using Argon2id
use crate::error::{AuthError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// Inclusive password length bounds, applied after trimming surrounding
/// whitespace.
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 20;

/// Digest verified on the "no such record" path so that a missing identifier
/// costs the same as a wrong password.
static DUMMY_DIGEST: Lazy<String> = Lazy::new(|| {
    hash_password("placeholder-for-timing-defense")
        .expect("dummy digest hashing cannot fail with a valid entropy source")
});

/// Hash a password using Argon2id
///
/// ## Security
///
/// - Algorithm: Argon2id (default configuration)
/// - Salt: Random 16-byte salt generated per password
///
/// ## Returns
///
/// PHC-formatted hash string safe for database storage
///
/// ## Errors
///
/// Hashing failure (e.g. entropy source failure) is an internal error and
/// aborts the operation; there is no fallback to weaker hashing.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its PHC-formatted hash
///
/// Uses the argon2 verifier's constant-time comparison. A mismatch is
/// `Ok(false)`; anything else (malformed digest, backend failure) is an
/// internal error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AuthError::Internal(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Burn a verification against a fixed digest.
///
/// Called when no credential record exists for a presented identifier, so
/// that response latency does not distinguish "unknown email" from "wrong
/// password".
pub fn dummy_verify(password: &str) {
    let _ = verify_password(password, &DUMMY_DIGEST);
}

/// Validate the password length policy: 6 to 20 characters inclusive after
/// trimming surrounding whitespace.
pub fn validate_password_policy(password: &str) -> Result<()> {
    let trimmed = password.trim();
    let length = trimmed.chars().count();
    if length < MIN_PASSWORD_LEN || length > MAX_PASSWORD_LEN {
        return Err(AuthError::PolicyViolation(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_valid_password() {
        let password = "correct-horse";
        let hash = hash_password(password).expect("should hash password successfully");
        assert!(verify_password(password, &hash).expect("should verify successfully"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let password = "correct-horse";
        let hash = hash_password(password).expect("should hash password successfully");
        assert!(!verify_password("battery-staple", &hash).expect("verification should succeed"));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "correct-horse";
        let hash1 = hash_password(password).expect("should hash successfully");
        let hash2 = hash_password(password).expect("should hash successfully");
        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_malformed_digest_is_internal_error() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_policy_bounds_are_inclusive() {
        assert!(validate_password_policy("123456").is_ok());
        assert!(validate_password_policy("a".repeat(20).as_str()).is_ok());
        assert!(matches!(
            validate_password_policy("12345"),
            Err(AuthError::PolicyViolation(_))
        ));
        assert!(matches!(
            validate_password_policy("a".repeat(21).as_str()),
            Err(AuthError::PolicyViolation(_))
        ));
    }

    #[test]
    fn test_policy_counts_characters_not_bytes() {
        // 12 characters, 24 bytes
        assert!(validate_password_policy("ü".repeat(12).as_str()).is_ok());
        assert!(validate_password_policy("ü".repeat(5).as_str()).is_err());
        assert!(validate_password_policy("ü".repeat(21).as_str()).is_err());
    }

    #[test]
    fn test_policy_trims_surrounding_whitespace() {
        assert!(validate_password_policy("  123456  ").is_ok());
        assert!(validate_password_policy("  1234  ").is_err());
    }

    #[test]
    fn test_dummy_verify_does_not_panic() {
        dummy_verify("whatever");
    }
}
