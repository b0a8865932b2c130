//! Drop scheduling.

use axum::Json;
use okami_core::DropId;
use serde::Deserialize;
use serde_json::json;

use super::{Action, ActionResult, IdInput};
use crate::error::ApiError;
use crate::models::{DropChanges, NewDrop};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct CreateDropInput {
    drop: NewDrop,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateDropInput {
    id: DropId,
    updates: DropChanges,
}

pub(super) async fn get_drops(state: &AppState) -> ActionResult {
    let drops = state.drops().list().await?;
    Ok(Json(json!({ "drops": drops })))
}

pub(super) async fn create_drop(state: &AppState, input: CreateDropInput) -> ActionResult {
    let drop = input.drop.validate().map_err(ApiError::Validation)?;
    let drop = state.drops().create(drop).await?;

    tracing::info!(action = %Action::CreateDrop, entity_id = %drop.id, "Drop created");
    Ok(Json(json!({ "drop": drop })))
}

pub(super) async fn update_drop(state: &AppState, input: UpdateDropInput) -> ActionResult {
    let changes = input.updates.validate().map_err(ApiError::Validation)?;
    let drop = state
        .drops()
        .update(input.id, changes)
        .await
        .map_err(ApiError::not_found("drop", input.id))?;

    tracing::info!(action = %Action::UpdateDrop, entity_id = %drop.id, "Drop updated");
    Ok(Json(json!({ "drop": drop })))
}

/// Detach the drop's products and deactivate it.
pub(super) async fn cancel_drop(state: &AppState, input: IdInput<DropId>) -> ActionResult {
    state
        .drops()
        .cancel(input.id)
        .await
        .map_err(ApiError::not_found("drop", input.id))?;

    tracing::info!(action = %Action::CancelDrop, entity_id = %input.id, "Drop cancelled");
    Ok(Json(json!({ "success": true })))
}

/// Release the drop's products as new arrivals and deactivate it.
pub(super) async fn complete_drop(state: &AppState, input: IdInput<DropId>) -> ActionResult {
    state
        .drops()
        .complete(input.id)
        .await
        .map_err(ApiError::not_found("drop", input.id))?;

    tracing::info!(action = %Action::CompleteDrop, entity_id = %input.id, "Drop completed");
    Ok(Json(json!({ "success": true })))
}
