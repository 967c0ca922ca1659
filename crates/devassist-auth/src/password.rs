//! Password checks for login.
//!
//! Stored hashes are PHC strings written by the user repository. The
//! Argon2 parameters are read back from the string, so the verifier
//! instance here needs no configuration.

use std::sync::LazyLock;

use argon2::password_hash::{Error as HashError, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// Hash of a throwaway secret with the same Argon2id cost as real user
/// hashes. `None` only if hashing itself is broken.
static DECOY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let salt = SaltString::encode_b64(b"devassist-decoy!").ok()?;
    Argon2::default()
        .hash_password(b"devassist-decoy-secret", &salt)
        .ok()
        .map(|h| h.to_string())
});

/// The bytes Argon2 sees: pepper first, then the password.
fn secret_input(password: &str, pepper: Option<&str>) -> Vec<u8> {
    let mut input = Vec::with_capacity(pepper.map_or(0, str::len) + password.len());
    if let Some(p) = pepper {
        input.extend_from_slice(p.as_bytes());
    }
    input.extend_from_slice(password.as_bytes());
    input
}

/// `Ok(false)` on mismatch; `Err(Crypto)` only when `hash` is not a usable
/// PHC string.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let stored = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("stored hash is not a PHC string: {e}")))?;

    match Argon2::default().verify_password(&secret_input(password, pepper), &stored) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("argon2 verification failed: {e}"))),
    }
}

/// Spend one full verification against the decoy hash. Login calls this
/// for unknown emails so they take as long as a wrong password.
pub fn verify_against_decoy(password: &str, pepper: Option<&str>) {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash, pepper);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::rand_core::OsRng;

    fn hash(secret: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn matching_and_mismatching_passwords() {
        let h = hash("devassist");
        assert!(verify_password("devassist", &h, None).unwrap());
        assert!(!verify_password("devassist!", &h, None).unwrap());
    }

    #[test]
    fn pepper_comes_first() {
        let h = hash("s3cr3t:devassist");
        assert!(verify_password("devassist", &h, Some("s3cr3t:")).unwrap());
        assert!(!verify_password("devassist", &h, None).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("pw", "plaintext", None),
            Err(AuthError::Crypto(_))
        ));
    }

    #[test]
    fn decoy_hash_uses_user_hash_parameters() {
        let decoy = DECOY_HASH.as_deref().unwrap();
        let parsed = PasswordHash::new(decoy).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(decoy.contains("m=19456,t=2,p=1"));
        assert!(!verify_password("devassist", decoy, None).unwrap());
    }
}
