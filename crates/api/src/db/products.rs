//! Product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use okami_core::{DropId, Price, ProductCategory, ProductId};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductChanges};

const PRODUCT_COLUMNS: &str = "id, title, price, original_price, images, sizes, stock, \
     category, description, drop_id, is_new, has_fire_effect, sold_out_at, created_at, updated_at";

#[automock]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, newest first.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Look up a single product.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Apply a partial update. Returns `NotFound` if the product is gone.
    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, RepositoryError>;

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;

    /// Products with zero stock whose `sold_out_at` is older than `cutoff`.
    async fn list_sold_out_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Delete the given products, returning how many rows were removed.
    async fn delete_many(&self, ids: Vec<ProductId>) -> Result<u64, RepositoryError>;
}

/// `PostgreSQL`-backed product repository.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO products (
                title, price, original_price, images, sizes, stock, category,
                description, drop_id, is_new, has_fire_effect
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PRODUCT_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.title)
            .bind(product.price)
            .bind(product.original_price)
            .bind(&product.images)
            .bind(&product.sizes)
            .bind(product.stock)
            .bind(product.category)
            .bind(&product.description)
            .bind(product.drop_id)
            .bind(product.is_new)
            .bind(product.has_fire_effect)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, RepositoryError> {
        // Nullable columns take a (present, value) pair so that an explicit
        // null can be told apart from "not sent".
        let sql = format!(
            r"
            UPDATE products SET
                title = COALESCE($2, title),
                price = COALESCE($3, price),
                original_price = CASE WHEN $4 THEN $5 ELSE original_price END,
                images = COALESCE($6, images),
                sizes = COALESCE($7, sizes),
                stock = COALESCE($8, stock),
                category = COALESCE($9, category),
                description = CASE WHEN $10 THEN $11 ELSE description END,
                drop_id = CASE WHEN $12 THEN $13 ELSE drop_id END,
                is_new = COALESCE($14, is_new),
                has_fire_effect = COALESCE($15, has_fire_effect),
                sold_out_at = CASE WHEN $16 THEN $17 ELSE sold_out_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(changes.price)
            .bind(changes.original_price.is_some())
            .bind(changes.original_price.flatten())
            .bind(&changes.images)
            .bind(&changes.sizes)
            .bind(changes.stock)
            .bind(changes.category)
            .bind(changes.description.is_some())
            .bind(changes.description.clone().flatten())
            .bind(changes.drop_id.is_some())
            .bind(changes.drop_id.flatten())
            .bind(changes.is_new)
            .bind(changes.has_fire_effect)
            .bind(changes.sold_out_at.is_some())
            .bind(changes.sold_out_at.flatten())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_sold_out_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE stock = 0
              AND sold_out_at IS NOT NULL
              AND sold_out_at < $1
            "
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete_many(&self, ids: Vec<ProductId>) -> Result<u64, RepositoryError> {
        let ids: Vec<Uuid> = ids.into_iter().map(Uuid::from).collect();
        let result = sqlx::query(r"DELETE FROM products WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    title: String,
    price: Price,
    original_price: Option<Price>,
    images: Vec<String>,
    sizes: Vec<String>,
    stock: i32,
    category: ProductCategory,
    description: Option<String>,
    drop_id: Option<DropId>,
    is_new: bool,
    has_fire_effect: bool,
    sold_out_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            price: row.price,
            original_price: row.original_price,
            images: row.images,
            sizes: row.sizes,
            stock: row.stock,
            category: row.category,
            description: row.description,
            drop_id: row.drop_id,
            is_new: row.is_new,
            has_fire_effect: row.has_fire_effect,
            sold_out_at: row.sold_out_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
