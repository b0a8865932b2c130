//! Admin password verification.
//!
//! Passwords are stored as `hex(salt) + ":" + hex(sha256(salt || password))`
//! with a 16-byte random salt. A stored value without a colon is a legacy
//! plaintext password and is compared verbatim; the next password change
//! replaces it with the salted form.

mod error;

pub use error::CredentialError;

use std::sync::Arc;

use okami_core::StoredCredential;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::db::CredentialRepository;

/// Minimum admin password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const SALT_BYTES: usize = 16;

/// Hash a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut salt);
    format!("{}:{}", hex::encode(salt), salted_digest(&salt, password))
}

/// Check `password` against a stored credential.
///
/// A salted credential whose salt is not valid hex never verifies.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    match StoredCredential::parse(stored) {
        StoredCredential::LegacyPlaintext(plain) => constant_time_compare(plain, password),
        StoredCredential::Salted {
            salt_hex,
            digest_hex,
        } => hex::decode(salt_hex).is_ok_and(|salt| {
            constant_time_compare(&salted_digest(&salt, password), digest_hex)
        }),
    }
}

fn salted_digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// Verifies and rotates the single admin credential.
#[derive(Clone)]
pub struct CredentialService {
    credentials: Arc<dyn CredentialRepository>,
}

impl CredentialService {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { credentials }
    }

    /// Check a submitted password against the stored credential.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::NotConfigured` if no credential exists, or a
    /// repository error.
    pub async fn verify(&self, password: &str) -> Result<bool, CredentialError> {
        let stored = self
            .credentials
            .password_hash()
            .await?
            .ok_or(CredentialError::NotConfigured)?;

        Ok(verify_password(password, &stored))
    }

    /// Replace the password after verifying the current one.
    ///
    /// Nothing is written unless both checks pass.
    ///
    /// # Errors
    ///
    /// Returns `IncorrectPassword` if `old` does not verify, then
    /// `PasswordTooShort` if `new` is under [`MIN_PASSWORD_LENGTH`] characters.
    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), CredentialError> {
        if !self.verify(old).await? {
            return Err(CredentialError::IncorrectPassword);
        }
        self.set_password(new).await
    }

    /// Store a new password without checking the old one. Used by the CLI to
    /// bootstrap or reset the credential.
    ///
    /// # Errors
    ///
    /// Returns `PasswordTooShort` or a repository error.
    pub async fn set_password(&self, new: &str) -> Result<(), CredentialError> {
        if new.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialError::PasswordTooShort);
        }
        self.credentials
            .set_password_hash(hash_password(new))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService").finish_non_exhaustive()
    }
}
