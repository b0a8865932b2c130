//! Catalog administration.

use axum::Json;
use okami_core::ProductId;
use serde::Deserialize;
use serde_json::json;

use super::{Action, ActionResult, IdInput};
use crate::error::ApiError;
use crate::models::{NewProduct, ProductChanges};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct AddProductInput {
    product: NewProduct,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateProductInput {
    id: ProductId,
    updates: ProductChanges,
}

pub(super) async fn get_products(state: &AppState) -> ActionResult {
    let products = state.products().list().await?;
    Ok(Json(json!({ "products": products })))
}

pub(super) async fn add_product(state: &AppState, input: AddProductInput) -> ActionResult {
    let product = input.product.validate().map_err(ApiError::Validation)?;
    let product = state.products().create(product).await?;

    tracing::info!(action = %Action::AddProduct, entity_id = %product.id, "Product created");
    Ok(Json(json!({ "product": product })))
}

pub(super) async fn update_product(state: &AppState, input: UpdateProductInput) -> ActionResult {
    let changes = input.updates.validate().map_err(ApiError::Validation)?;
    let product = state
        .catalog()
        .update_product(input.id, changes)
        .await
        .map_err(ApiError::not_found("product", input.id))?;

    tracing::info!(action = %Action::UpdateProduct, entity_id = %product.id, "Product updated");
    Ok(Json(json!({ "product": product })))
}

pub(super) async fn delete_product(state: &AppState, input: IdInput<ProductId>) -> ActionResult {
    state
        .products()
        .delete(input.id)
        .await
        .map_err(ApiError::not_found("product", input.id))?;

    tracing::info!(action = %Action::DeleteProduct, entity_id = %input.id, "Product deleted");
    Ok(Json(json!({ "success": true })))
}

pub(super) async fn cleanup_sold_out(state: &AppState) -> ActionResult {
    let cleaned = state.catalog().cleanup_sold_out().await?;

    tracing::info!(action = %Action::CleanupSoldOut, cleaned, "Sold-out cleanup finished");
    Ok(Json(json!({ "success": true, "cleaned": cleaned })))
}
