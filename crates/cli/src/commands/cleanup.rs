//! Catalog maintenance commands.

use okami_api::state::AppState;

use super::{CliError, connect};

/// Delete products sold out for longer than the retention window.
///
/// Uses the same storage configuration as the API server, so product images
/// are only removed when `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY` are
/// set.
pub async fn sold_out() -> Result<(), CliError> {
    let (config, pool) = connect().await?;
    let state = AppState::from_pool(&config, pool)?;

    let cleaned = state.catalog().cleanup_sold_out().await?;

    tracing::info!(cleaned, "Sold-out cleanup complete");
    Ok(())
}
