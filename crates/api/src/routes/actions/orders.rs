//! Checkout submission and order administration.

use axum::Json;
use okami_core::{OrderId, OrderStatus};
use serde::Deserialize;
use serde_json::json;

use super::{Action, ActionResult};
use crate::models::OrderDraft;
use crate::services::orders;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct UpdateStatusInput {
    id: OrderId,
    status: OrderStatus,
}

pub(super) async fn submit_order(state: &AppState, draft: OrderDraft) -> ActionResult {
    let order = state.order_validator().submit(&draft).await?;

    tracing::info!(
        action = %Action::SubmitOrder,
        entity_id = %order.id,
        total = %order.total,
        wilaya = %order.wilaya,
        "Order submitted"
    );
    Ok(Json(json!({ "success": true, "order": order })))
}

pub(super) async fn get_orders(state: &AppState) -> ActionResult {
    let orders = state.orders().list().await?;
    Ok(Json(json!({ "orders": orders })))
}

pub(super) async fn update_order_status(state: &AppState, input: UpdateStatusInput) -> ActionResult {
    let order = orders::update_order_status(state.orders(), input.id, input.status).await?;

    tracing::info!(
        action = %Action::UpdateOrderStatus,
        entity_id = %order.id,
        status = %order.status,
        "Order status updated"
    );
    Ok(Json(json!({ "order": order })))
}
