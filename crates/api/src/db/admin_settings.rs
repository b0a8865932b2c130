//! Admin credential storage (`admin_settings`, a single row).

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;

use super::RepositoryError;

#[automock]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// The stored `password_hash`, or `None` if no credential was ever set.
    async fn password_hash(&self) -> Result<Option<String>, RepositoryError>;

    /// Replace the stored credential, creating the row on first use.
    async fn set_password_hash(&self, password_hash: String) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed credential repository.
#[derive(Debug, Clone)]
pub struct PgCredentialRepository {
    pool: PgPool,
}

impl PgCredentialRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn password_hash(&self) -> Result<Option<String>, RepositoryError> {
        let hash: Option<(String,)> = sqlx::query_as(
            r"SELECT password_hash FROM admin_settings ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash.map(|(h,)| h))
    }

    async fn set_password_hash(&self, password_hash: String) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"UPDATE admin_settings SET password_hash = $1, updated_at = NOW()",
        )
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(r"INSERT INTO admin_settings (password_hash) VALUES ($1)")
                .bind(&password_hash)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
