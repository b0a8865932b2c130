//! Drop repository.
//!
//! Cancelling or completing a drop touches both `drops` and `products`, so
//! those two operations run in a transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use okami_core::{BackgroundType, DropId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{self, DropChanges, NewDrop};

const DROP_COLUMNS: &str = "id, name, release_date, lookbook_images, background_url, \
     background_type, is_active, global_fire_effect, created_at, updated_at";

#[automock]
#[async_trait]
pub trait DropRepository: Send + Sync {
    /// All drops, newest first.
    async fn list(&self) -> Result<Vec<models::Drop>, RepositoryError>;

    /// Insert a new, active drop.
    async fn create(&self, drop: NewDrop) -> Result<models::Drop, RepositoryError>;

    async fn update(
        &self,
        id: DropId,
        changes: DropChanges,
    ) -> Result<models::Drop, RepositoryError>;

    /// Detach every product from the drop and deactivate it.
    async fn cancel(&self, id: DropId) -> Result<(), RepositoryError>;

    /// Flag every product in the drop as new and deactivate it.
    async fn complete(&self, id: DropId) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed drop repository.
#[derive(Debug, Clone)]
pub struct PgDropRepository {
    pool: PgPool,
}

impl PgDropRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn close(&self, id: DropId, products_sql: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(products_sql)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r"UPDATE drops SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the product changes.
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DropRepository for PgDropRepository {
    async fn list(&self) -> Result<Vec<models::Drop>, RepositoryError> {
        let sql = format!("SELECT {DROP_COLUMNS} FROM drops ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, DropRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(models::Drop::from).collect())
    }

    async fn create(&self, drop: NewDrop) -> Result<models::Drop, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO drops (
                name, release_date, lookbook_images, background_url,
                background_type, is_active, global_fire_effect
            )
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING {DROP_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, DropRow>(&sql)
            .bind(&drop.name)
            .bind(drop.release_date)
            .bind(&drop.lookbook_images)
            .bind(&drop.background_url)
            .bind(drop.background_type)
            .bind(drop.global_fire_effect)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update(&self, id: DropId, changes: DropChanges) -> Result<models::Drop, RepositoryError> {
        let sql = format!(
            r"
            UPDATE drops SET
                name = COALESCE($2, name),
                release_date = COALESCE($3, release_date),
                lookbook_images = COALESCE($4, lookbook_images),
                background_url = CASE WHEN $5 THEN $6 ELSE background_url END,
                background_type = COALESCE($7, background_type),
                is_active = COALESCE($8, is_active),
                global_fire_effect = COALESCE($9, global_fire_effect),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DROP_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, DropRow>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(changes.release_date)
            .bind(&changes.lookbook_images)
            .bind(changes.background_url.is_some())
            .bind(changes.background_url.clone().flatten())
            .bind(changes.background_type)
            .bind(changes.is_active)
            .bind(changes.global_fire_effect)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn cancel(&self, id: DropId) -> Result<(), RepositoryError> {
        self.close(
            id,
            r"UPDATE products SET drop_id = NULL, updated_at = NOW() WHERE drop_id = $1",
        )
        .await
    }

    async fn complete(&self, id: DropId) -> Result<(), RepositoryError> {
        self.close(
            id,
            r"UPDATE products SET is_new = TRUE, updated_at = NOW() WHERE drop_id = $1",
        )
        .await
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DropRow {
    id: DropId,
    name: String,
    release_date: DateTime<Utc>,
    lookbook_images: Vec<String>,
    background_url: Option<String>,
    background_type: BackgroundType,
    is_active: bool,
    global_fire_effect: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DropRow> for models::Drop {
    fn from(row: DropRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            release_date: row.release_date,
            lookbook_images: row.lookbook_images,
            background_url: row.background_url,
            background_type: row.background_type,
            is_active: row.is_active,
            global_fire_effect: row.global_fire_effect,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
