//! Public storefront catalog.

use axum::{Json, extract::State};

use crate::error::ApiError;
use crate::services::Storefront;
use crate::state::AppState;

/// `GET /catalog`: products visible right now plus the active drop.
pub async fn storefront(State(state): State<AppState>) -> Result<Json<Storefront>, ApiError> {
    Ok(Json(state.catalog().storefront().await?))
}
