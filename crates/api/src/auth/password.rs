//! One-way password digests.
//!
//! Passwords are stored as Argon2id PHC strings (algorithm, parameters and
//! salt embedded), so verification needs nothing but the stored string.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Digest a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored digest.
///
/// A mismatch is `Ok(false)`; `Err` means the stored digest is unreadable.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(digest)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Digest checked when a login names no user, so unknown names cost the same
/// Argon2 work as wrong passwords.
static DUMMY_DIGEST: LazyLock<Result<String, argon2::password_hash::Error>> =
    LazyLock::new(|| hash_password("warden-dummy-password"));

/// Check a login attempt against the user's digest, if there is a user.
///
/// Without a digest the password is still verified against a dummy digest
/// and the result is always `Ok(false)`.
pub fn verify_login(
    password: &str,
    digest: Option<&str>,
) -> Result<bool, argon2::password_hash::Error> {
    match digest {
        Some(digest) => verify_password(password, digest),
        None => {
            let dummy = DUMMY_DIGEST.as_ref().map_err(|e| e.clone())?;
            verify_password(password, dummy)?;
            Ok(false)
        }
    }
}
