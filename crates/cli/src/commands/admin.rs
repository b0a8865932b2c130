//! Admin credential commands.
//!
//! The password is read from the first line of stdin so it never appears in
//! shell history or the process list.

use std::sync::Arc;

use okami_api::db::PgCredentialRepository;
use okami_api::services::CredentialService;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliError, connect};

async fn credential_service() -> Result<CredentialService, CliError> {
    let (_, pool) = connect().await?;
    Ok(CredentialService::new(Arc::new(PgCredentialRepository::new(pool))))
}

async fn read_password() -> Result<String, CliError> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Store a new admin password, replacing any existing one.
pub async fn set_password() -> Result<(), CliError> {
    let password = read_password().await?;
    let service = credential_service().await?;

    service.set_password(&password).await?;

    tracing::info!("Admin password updated");
    Ok(())
}

/// Check a password against the stored credential.
pub async fn check_password() -> Result<(), CliError> {
    let password = read_password().await?;
    let service = credential_service().await?;

    if !service.verify(&password).await? {
        return Err(CliError::PasswordMismatch);
    }

    tracing::info!("Password matches the stored credential");
    Ok(())
}
