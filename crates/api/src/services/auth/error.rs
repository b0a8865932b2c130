//! Admin credential error types.

use thiserror::Error;

use super::MIN_PASSWORD_LENGTH;
use crate::db::RepositoryError;

/// Errors from verifying or changing the admin password.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The current password did not verify.
    #[error("incorrect old password")]
    IncorrectPassword,

    /// The replacement password is too short.
    #[error("new password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    /// No `admin_settings` row exists yet.
    #[error("admin password has not been set")]
    NotConfigured,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
