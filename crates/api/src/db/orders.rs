//! Order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use okami_core::{DeliveryType, OrderId, OrderStatus, Price};
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderLine};

const ORDER_COLUMNS: &str =
    "id, customer_name, phone, wilaya, delivery_type, items, total, status, created_at";

#[automock]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a validated order with status `pending`, in a single insert.
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Move the order to `status` only if its current status allows it
    /// ([`OrderStatus::can_transition_to`]), checked in the same write.
    /// `None` when no row qualified.
    async fn transition_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// `PostgreSQL`-backed order repository.
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO orders (customer_name, phone, wilaya, delivery_type, items, total, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING {ORDER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(&order.customer_name)
            .bind(order.phone.as_str())
            .bind(order.wilaya.as_str())
            .bind(order.delivery_type)
            .bind(Json(&order.items))
            .bind(order.total)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    async fn transition_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let sources: Vec<&str> = OrderStatus::sources_of(status)
            .map(OrderStatus::as_str)
            .collect();
        let sql = format!(
            r"
            UPDATE orders SET status = $2
            WHERE id = $1 AND status::text = ANY($3)
            RETURNING {ORDER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(status)
            .bind(sources)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Order::from))
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_name: String,
    phone: String,
    wilaya: String,
    delivery_type: DeliveryType,
    items: Json<Vec<OrderLine>>,
    total: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_name: row.customer_name,
            phone: row.phone,
            wilaya: row.wilaya,
            delivery_type: row.delivery_type,
            items: row.items.0,
            total: row.total,
            status: row.status,
            created_at: row.created_at,
        }
    }
}
