use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::error::{AuthError, AuthResult};

/// Hashes `plain` with argon2id and a fresh random salt; returns a PHC string.
pub fn hash_password(plain: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AuthError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Checks `plain` against a stored PHC hash.
///
/// Anything that is not a parseable hash counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> AuthResult<()> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        warn!(error = %e, "stored credential is not a valid argon2 hash");
        AuthError::CredentialMismatch
    })?;
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .map_err(|_| AuthError::CredentialMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        let err = verify_password("wrong-password", &hash).unwrap_err();
        assert!(matches!(err, AuthError::CredentialMismatch));
    }

    #[test]
    fn verify_rejects_prefix_and_extension_of_secret() {
        let hash = hash_password("hunter2").expect("hashing should succeed");
        assert!(verify_password("hunter", &hash).is_err());
        assert!(verify_password("hunter22", &hash).is_err());
    }

    #[test]
    fn same_secret_hashes_differently() {
        let a = hash_password("same").expect("hash a");
        let b = hash_password("same").expect("hash b");
        assert_ne!(a, b);
        assert!(verify_password("same", &a).is_ok());
        assert!(verify_password("same", &b).is_ok());
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        let err = verify_password("anything", "NULL").unwrap_err();
        assert!(matches!(err, AuthError::CredentialMismatch));
    }
}
