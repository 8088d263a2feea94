//! Secret hashing and verification using Argon2id.
//!
//! Hashing lives here, not in the storage layer: the store only ever
//! receives finished PHC strings, so the credential lifecycle stays
//! visible and testable independent of the database engine.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// Hash a secret with Argon2id using OWASP-recommended parameters
/// (memory: 19 MiB, iterations: 2, parallelism: 1). The salt is
/// randomly generated per call; an optional server-side pepper is
/// prepended before hashing.
pub fn hash_secret(secret: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{secret}");
            peppered.as_bytes()
        }
        None => secret.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| AuthError::Crypto(format!("secret hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext secret against an Argon2id PHC-format hash.
/// Comparison happens inside the argon2 verifier, in constant time.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_secret(secret: &str, hash: &str, pepper: Option<&str>) -> Result<bool, AuthError> {
    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{secret}");
            peppered.as_bytes()
        }
        None => secret.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_secret_matches() {
        let hash = hash_secret("asha0204@A1", None).unwrap();
        assert!(verify_secret("asha0204@A1", &hash, None).unwrap());
    }

    #[test]
    fn wrong_secret_does_not_match() {
        let hash = hash_secret("asha0204@A1", None).unwrap();
        assert!(!verify_secret("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_secret("hunter2hunter2", Some("pepper!")).unwrap();
        assert!(verify_secret("hunter2hunter2", &hash, Some("pepper!")).unwrap());
        // Without pepper should fail.
        assert!(!verify_secret("hunter2hunter2", &hash, None).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        let result = verify_secret("pw", "not-a-hash", None);
        assert!(result.is_err());
    }

    #[test]
    fn salts_differ_between_calls() {
        let h1 = hash_secret("same-secret", None).unwrap();
        let h2 = hash_secret("same-secret", None).unwrap();
        assert_ne!(h1, h2);
    }
}
