//! Customer orders.

use chrono::{DateTime, Utc};
use okami_core::{DeliveryType, OrderId, OrderStatus, PhoneNumber, Price, ProductId, Wilaya};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog snapshot of a product at the moment the order was validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: OrderedProduct,
    pub size: String,
    pub quantity: u32,
}

impl OrderLine {
    /// `price × quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.product.price.times(self.quantity)
    }
}

/// A persisted order.
///
/// `total` is computed once from catalog prices at submission and never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub phone: String,
    pub wilaya: String,
    pub delivery_type: DeliveryType,
    pub items: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated order ready for insertion. Status is always `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: PhoneNumber,
    pub wilaya: Wilaya,
    pub delivery_type: DeliveryType,
    pub items: Vec<OrderLine>,
    pub total: Price,
}

/// Order as submitted by the checkout page.
///
/// Every field is kept as raw JSON so that malformed input is reported with
/// the validator's own messages rather than a generic parse error. `total` and
/// any product fields besides `id` are advisory and ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[serde(default)]
    pub customer_name: Value,
    #[serde(default)]
    pub phone: Value,
    #[serde(default)]
    pub wilaya: Value,
    #[serde(default)]
    pub delivery_type: Value,
    #[serde(default)]
    pub items: Value,
    #[serde(default)]
    pub total: Value,
}
