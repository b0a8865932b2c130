pub mod admin;
pub mod cleanup;
pub mod migrate;

use okami_api::config::{ApiConfig, ConfigError};
use okami_api::db::{self, RepositoryError};
use okami_api::services::{CredentialError, StorageError};
use sqlx::PgPool;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Credential(#[from] CredentialError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to read stdin: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password does not match the stored credential")]
    PasswordMismatch,
}

/// Load configuration and connect to the database.
async fn connect() -> Result<(ApiConfig, PgPool), CliError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, pool))
}
