//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build
//! time.

use super::{CliError, connect};

/// Apply pending migrations.
pub async fn run() -> Result<(), CliError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
