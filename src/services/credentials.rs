//! Password hashing and verification with Argon2.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, error, instrument};

use crate::error::{Error, Result};

/// Hashes a plain-text password with a fresh random salt.
#[instrument(name = "credentials::hash_password", skip_all, err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
    if password.trim().is_empty() {
        return Err(Error::validation("password cannot be empty"));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hashing failed");
            Error::Internal(format!("password hashing failed: {e}"))
        })
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Mismatches and unparseable hashes both fail with `Authentication`.
#[instrument(name = "credentials::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, password: &str) -> Result<()> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        Error::Authentication("invalid credentials".to_string())
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| {
            debug!("password mismatch");
            Error::Authentication("invalid credentials".to_string())
        })
}

/// Spends one Argon2 verification on a password that matches no account,
/// so unknown usernames cost as much as wrong passwords.
///
/// Always fails with `Authentication`.
#[instrument(name = "credentials::reject_unknown_user", skip_all)]
pub fn reject_unknown_user(password: &str) -> Error {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| hash_password("no account has this password").ok());
    if let Some(hash) = dummy {
        // No account backs the dummy hash, so a match is ignored too
        let _ = verify_password(hash, password);
    }
    Error::Authentication("invalid credentials".to_string())
}
