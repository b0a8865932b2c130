//! Order submission.
//!
//! The checkout page sends a cart snapshot whose prices and total cannot be
//! trusted. [`OrderValidator`] rebuilds the order from live catalog rows:
//! every line is re-priced, size and stock are checked, and the total is
//! recomputed. Checks run in a fixed order and the first failure wins;
//! nothing is written unless every check passes.
//!
//! Stock is checked but not reserved, so two concurrent orders for the last
//! unit can both be accepted. Admins reconcile that when confirming orders.

use std::sync::Arc;

use okami_core::{DeliveryType, OrderId, OrderStatus, PhoneNumber, Price, ProductId, Wilaya};
use serde_json::Value;
use thiserror::Error;

use super::sanitize::sanitize_string;
use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::{NewOrder, Order, OrderDraft, OrderLine, OrderedProduct};

pub const MAX_CUSTOMER_NAME_LENGTH: usize = 100;
pub const MIN_CUSTOMER_NAME_LENGTH: usize = 2;
pub const MAX_ORDER_ITEMS: usize = 20;
pub const MAX_ITEM_QUANTITY: u32 = 10;
/// Largest value `orders.total` (`NUMERIC(12, 2)`) can store, in centimes.
pub const MAX_ORDER_TOTAL_CENTIMES: i64 = 999_999_999_999;

/// Reasons an order submission is refused.
#[derive(Debug, Error)]
pub enum OrderRejection {
    #[error("invalid customer name")]
    CustomerName,

    #[error("invalid phone number")]
    Phone,

    #[error("invalid wilaya")]
    Wilaya,

    #[error("invalid delivery type")]
    DeliveryType,

    #[error("order must contain between 1 and {} items", MAX_ORDER_ITEMS)]
    ItemCount,

    #[error("order item {0} is missing a product, size or quantity")]
    IncompleteItem(usize),

    #[error("invalid quantity for item {0}")]
    Quantity(usize),

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("size {size} is not available for {title}")]
    SizeUnavailable { size: String, title: String },

    #[error("insufficient stock for {title}")]
    InsufficientStock { title: String },

    #[error("order total is out of range")]
    TotalOverflow,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl OrderRejection {
    /// Whether the rejection is the customer's to fix (as opposed to a
    /// storage failure).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}

/// Validates and persists storefront orders.
#[derive(Clone)]
pub struct OrderValidator {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderValidator {
    #[must_use]
    pub fn new(products: Arc<dyn ProductRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { products, orders }
    }

    /// Validate a draft and insert it as a `pending` order.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, or a repository error from a product
    /// lookup or the insert.
    pub async fn submit(&self, draft: &OrderDraft) -> Result<Order, OrderRejection> {
        let order = self.validate(draft).await?;
        Ok(self.orders.insert(order).await?)
    }

    /// Run every check and build the order to persist, without writing.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub async fn validate(&self, draft: &OrderDraft) -> Result<NewOrder, OrderRejection> {
        let customer_name = sanitize_string(&draft.customer_name, MAX_CUSTOMER_NAME_LENGTH);
        if customer_name.chars().count() < MIN_CUSTOMER_NAME_LENGTH {
            return Err(OrderRejection::CustomerName);
        }

        let phone = draft
            .phone
            .as_str()
            .and_then(|p| PhoneNumber::parse(p).ok())
            .ok_or(OrderRejection::Phone)?;

        let wilaya = draft
            .wilaya
            .as_str()
            .and_then(|w| Wilaya::parse(w).ok())
            .ok_or(OrderRejection::Wilaya)?;

        let delivery_type = draft
            .delivery_type
            .as_str()
            .and_then(|d| d.parse::<DeliveryType>().ok())
            .ok_or(OrderRejection::DeliveryType)?;

        let raw_items = match draft.items.as_array() {
            Some(items) if !items.is_empty() && items.len() <= MAX_ORDER_ITEMS => items,
            _ => return Err(OrderRejection::ItemCount),
        };

        let mut items = Vec::with_capacity(raw_items.len());
        let mut total = Price::ZERO;

        for (index, raw) in raw_items.iter().enumerate() {
            let line = self.price_line(index, raw).await?;
            let line_total = line.line_total().ok_or(OrderRejection::TotalOverflow)?;
            total = total
                .checked_add(line_total)
                .ok_or(OrderRejection::TotalOverflow)?;
            items.push(line);
        }
        if total > Price::from_centimes(MAX_ORDER_TOTAL_CENTIMES) {
            return Err(OrderRejection::TotalOverflow);
        }

        Ok(NewOrder {
            customer_name,
            phone,
            wilaya,
            delivery_type,
            items,
            total,
        })
    }

    async fn price_line(&self, index: usize, raw: &Value) -> Result<OrderLine, OrderRejection> {
        let position = index + 1;

        let product_id = raw
            .get("product")
            .and_then(|p| p.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());
        let size = raw
            .get("size")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let quantity = raw.get("quantity").filter(|q| !q.is_null());

        let (Some(product_id), Some(size), Some(quantity)) = (product_id, size, quantity) else {
            return Err(OrderRejection::IncompleteItem(position));
        };

        let quantity = whole_number(quantity)
            .filter(|q| (1..=MAX_ITEM_QUANTITY).contains(q))
            .ok_or(OrderRejection::Quantity(position))?;

        // An id that is not even a UUID cannot name a product.
        let not_found = || OrderRejection::ProductNotFound(product_id.to_owned());
        let id = ProductId::parse(product_id).map_err(|_| not_found())?;
        let product = self.products.find(id).await?.ok_or_else(not_found)?;

        if !product.offers_size(size) {
            return Err(OrderRejection::SizeUnavailable {
                size: size.to_owned(),
                title: product.title,
            });
        }

        if !product.has_stock_for(quantity) {
            return Err(OrderRejection::InsufficientStock {
                title: product.title,
            });
        }

        Ok(OrderLine {
            product: OrderedProduct {
                id: product.id,
                title: product.title,
                price: product.price,
            },
            size: size.to_owned(),
            quantity,
        })
    }
}

impl std::fmt::Debug for OrderValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderValidator").finish_non_exhaustive()
    }
}

/// A JSON number with no fractional part, as `u32`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked before the cast
fn whole_number(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.fract() != 0.0 || f < 0.0 || f > f64::from(u32::MAX) {
        return None;
    }
    Some(f as u32)
}

/// Apply an admin status change, enforcing one-way transitions out of
/// `pending`.
///
/// The guard is part of the update, so of two concurrent changes to a
/// pending order only the first one lands.
///
/// # Errors
///
/// `NotFound` if the order does not exist, `InvalidTransition` if the order
/// has already been confirmed or cancelled.
pub async fn update_order_status(
    orders: &dyn OrderRepository,
    id: OrderId,
    status: OrderStatus,
) -> Result<Order, StatusChangeError> {
    if let Some(order) = orders.transition_status(id, status).await? {
        return Ok(order);
    }

    // Nothing updated: either the order is gone or it left `pending`.
    match orders.find(id).await? {
        None => Err(StatusChangeError::NotFound(id)),
        Some(current) => Err(StatusChangeError::InvalidTransition {
            from: current.status,
            to: status,
        }),
    }
}

#[derive(Debug, Error)]
pub enum StatusChangeError {
    #[error("order not found: {0}")]
    NotFound(OrderId),

    #[error("order is already {from} and cannot become {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{MockOrderRepository, MockProductRepository};
    use crate::models::Product;
    use chrono::Utc;
    use okami_core::ProductCategory;
    use serde_json::json;
    use testresult::TestResult;

    const P1: &str = "00000000-0000-4000-8000-000000000001";

    fn product(id: &str, price: i64, stock: i32, sizes: &[&str]) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            title: "Kitsune Tee".to_owned(),
            price: Price::from_dinars(price),
            original_price: None,
            images: vec![],
            sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
            stock,
            category: ProductCategory::Tops,
            description: None,
            drop_id: None,
            is_new: false,
            has_fire_effect: false,
            sold_out_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft(items: Value) -> OrderDraft {
        serde_json::from_value(json!({
            "customerName": "Amine B.",
            "phone": "0551234567",
            "wilaya": "Alger",
            "deliveryType": "home",
            "items": items,
            "total": 1
        }))
        .unwrap()
    }

    fn validator(products: MockProductRepository) -> OrderValidator {
        let mut orders = MockOrderRepository::new();
        orders.expect_insert().never();
        OrderValidator::new(Arc::new(products), Arc::new(orders))
    }

    fn catalog_with_p1() -> MockProductRepository {
        let mut products = MockProductRepository::new();
        products
            .expect_find()
            .returning(|_| Ok(Some(product(P1, 1000, 2, &["m"]))));
        products
    }

    #[tokio::test]
    async fn test_total_is_recomputed() -> TestResult {
        let order = validator(catalog_with_p1())
            .validate(&draft(json!([{ "product": { "id": P1, "price": 1 }, "size": "m", "quantity": 2 }])))
            .await?;

        assert_eq!(order.total, Price::from_dinars(2000));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product.price, Price::from_dinars(1000));
        assert_eq!(order.phone.as_str(), "0551234567");
        assert_eq!(order.wilaya.as_str(), "alger");
        Ok(())
    }

    #[tokio::test]
    async fn test_total_beyond_stored_range_is_rejected() {
        let mut products = MockProductRepository::new();
        products
            .expect_find()
            .returning(|_| Ok(Some(product(P1, 6_000_000_000, 10, &["m"]))));

        let err = validator(products)
            .validate(&draft(json!([{ "product": { "id": P1 }, "size": "m", "quantity": 2 }])))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderRejection::TotalOverflow));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_insufficient_stock() {
        let err = validator(catalog_with_p1())
            .validate(&draft(json!([{ "product": { "id": P1 }, "size": "m", "quantity": 3 }])))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderRejection::InsufficientStock { .. }));
    }

    #[tokio::test]
    async fn test_size_unavailable() {
        let mut products = MockProductRepository::new();
        products
            .expect_find()
            .returning(|_| Ok(Some(product(P1, 1000, 5, &["s", "m"]))));

        let err = validator(products)
            .validate(&draft(json!([{ "product": { "id": P1 }, "size": "xl", "quantity": 1 }])))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "size xl is not available for Kitsune Tee");
    }

    #[tokio::test]
    async fn test_unknown_product_names_id() {
        let mut products = MockProductRepository::new();
        products.expect_find().returning(|_| Ok(None));

        let err = validator(products)
            .validate(&draft(json!([{ "product": { "id": P1 }, "size": "m", "quantity": 1 }])))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), format!("product not found: {P1}"));
    }

    #[tokio::test]
    async fn test_non_uuid_product_id_is_not_found_without_lookup() {
        let mut products = MockProductRepository::new();
        products.expect_find().never();

        let err = validator(products)
            .validate(&draft(json!([{ "product": { "id": "p1" }, "size": "m", "quantity": 1 }])))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "product not found: p1");
    }

    #[tokio::test]
    async fn test_field_checks_short_circuit_before_lookups() {
        let mut products = MockProductRepository::new();
        products.expect_find().never();
        let validator = validator(products);

        let mut bad_phone = draft(json!([]));
        bad_phone.phone = json!("0612345");
        assert!(matches!(
            validator.validate(&bad_phone).await,
            Err(OrderRejection::Phone)
        ));

        let mut bad_wilaya = draft(json!([]));
        bad_wilaya.wilaya = json!("Paris");
        assert!(matches!(
            validator.validate(&bad_wilaya).await,
            Err(OrderRejection::Wilaya)
        ));

        let mut bad_name = draft(json!([]));
        bad_name.customer_name = json!("<i>A</i>");
        assert!(matches!(
            validator.validate(&bad_name).await,
            Err(OrderRejection::CustomerName)
        ));

        let mut bad_delivery = draft(json!([]));
        bad_delivery.delivery_type = json!("relay");
        assert!(matches!(
            validator.validate(&bad_delivery).await,
            Err(OrderRejection::DeliveryType)
        ));

        assert!(matches!(
            validator.validate(&draft(json!([]))).await,
            Err(OrderRejection::ItemCount)
        ));
    }

    #[tokio::test]
    async fn test_too_many_items() {
        let mut products = MockProductRepository::new();
        products.expect_find().never();

        let line = json!({ "product": { "id": P1 }, "size": "m", "quantity": 1 });
        let items = Value::Array(vec![line; MAX_ORDER_ITEMS + 1]);

        assert!(matches!(
            validator(products).validate(&draft(items)).await,
            Err(OrderRejection::ItemCount)
        ));
    }

    #[tokio::test]
    async fn test_quantity_bounds() {
        let validator = validator(catalog_with_p1());

        for quantity in [json!(0), json!(11), json!(1.5), json!("2"), json!(-1)] {
            let items = json!([{ "product": { "id": P1 }, "size": "m", "quantity": quantity }]);
            assert!(
                matches!(
                    validator.validate(&draft(items)).await,
                    Err(OrderRejection::Quantity(1))
                ),
                "quantity {quantity} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_integral_float_quantity_accepted() -> TestResult {
        let items = json!([{ "product": { "id": P1 }, "size": "m", "quantity": 2.0 }]);
        let order = validator(catalog_with_p1()).validate(&draft(items)).await?;
        assert_eq!(order.items[0].quantity, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_item_fields() {
        let validator = validator(MockProductRepository::new());

        for item in [
            json!({ "size": "m", "quantity": 1 }),
            json!({ "product": {}, "size": "m", "quantity": 1 }),
            json!({ "product": { "id": P1 }, "quantity": 1 }),
            json!({ "product": { "id": P1 }, "size": "m" }),
            json!("not an object"),
        ] {
            assert!(matches!(
                validator.validate(&draft(json!([item]))).await,
                Err(OrderRejection::IncompleteItem(1))
            ));
        }
    }

    #[tokio::test]
    async fn test_submit_inserts_once() -> TestResult {
        let mut orders = MockOrderRepository::new();
        orders
            .expect_insert()
            .once()
            .withf(|order| order.total == Price::from_dinars(2000))
            .returning(|order| {
                Ok(Order {
                    id: OrderId::new(uuid::Uuid::new_v4()),
                    customer_name: order.customer_name,
                    phone: order.phone.into_inner(),
                    wilaya: order.wilaya.as_str().to_owned(),
                    delivery_type: order.delivery_type,
                    items: order.items,
                    total: order.total,
                    status: OrderStatus::Pending,
                    created_at: Utc::now(),
                })
            });

        let validator = OrderValidator::new(Arc::new(catalog_with_p1()), Arc::new(orders));
        let order = validator
            .submit(&draft(json!([{ "product": { "id": P1 }, "size": "m", "quantity": 2 }])))
            .await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Price::from_dinars(2000));
        Ok(())
    }

    fn order(id: OrderId, status: OrderStatus) -> Order {
        Order {
            id,
            customer_name: "Amine".to_owned(),
            phone: "0551234567".to_owned(),
            wilaya: "alger".to_owned(),
            delivery_type: DeliveryType::Desk,
            items: vec![],
            total: Price::ZERO,
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_status_change_is_one_way() {
        let id = OrderId::new(uuid::Uuid::new_v4());
        let mut orders = MockOrderRepository::new();
        orders
            .expect_transition_status()
            .once()
            .returning(|_, _| Ok(None));
        orders
            .expect_find()
            .once()
            .returning(move |_| Ok(Some(order(id, OrderStatus::Confirmed))));

        let err = update_order_status(&orders, id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "order is already confirmed and cannot become cancelled"
        );
    }

    #[tokio::test]
    async fn test_status_change_applied_without_second_read() -> TestResult {
        let id = OrderId::new(uuid::Uuid::new_v4());
        let mut orders = MockOrderRepository::new();
        orders
            .expect_transition_status()
            .withf(move |order_id, status| *order_id == id && *status == OrderStatus::Confirmed)
            .once()
            .returning(move |_, status| Ok(Some(order(id, status))));
        orders.expect_find().never();

        let updated = update_order_status(&orders, id, OrderStatus::Confirmed).await?;
        assert_eq!(updated.status, OrderStatus::Confirmed);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_change_on_missing_order() {
        let id = OrderId::new(uuid::Uuid::new_v4());
        let mut orders = MockOrderRepository::new();
        orders.expect_transition_status().returning(|_, _| Ok(None));
        orders.expect_find().returning(|_| Ok(None));

        let err = update_order_status(&orders, id, OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, StatusChangeError::NotFound(missing) if missing == id));
    }
}
