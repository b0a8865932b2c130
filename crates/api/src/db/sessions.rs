//! Durable admin sessions (`admin_sessions`).
//!
//! Only the SHA-256 of each token is stored, so a database dump cannot be
//! replayed as a bearer credential.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::RepositoryError;
use crate::services::sessions::{
    Clock, SESSION_TTL, SessionError, SessionStore, SystemClock, generate_token,
};

/// `PostgreSQL`-backed [`SessionStore`].
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }
}

impl std::fmt::Debug for PgSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSessionStore").finish_non_exhaustive()
    }
}

fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn issue(&self) -> Result<String, SessionError> {
        let token = generate_token();
        let expires_at = self.clock.now() + SESSION_TTL;

        sqlx::query(r"INSERT INTO admin_sessions (token_hash, expires_at) VALUES ($1, $2)")
            .bind(token_hash(&token))
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(token)
    }

    async fn is_valid(&self, token: &str) -> Result<bool, SessionError> {
        let hash = token_hash(token);
        let expires_at: Option<(DateTime<Utc>,)> =
            sqlx::query_as(r"SELECT expires_at FROM admin_sessions WHERE token_hash = $1")
                .bind(&hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(RepositoryError::from)?;

        let Some((expires_at,)) = expires_at else {
            return Ok(false);
        };

        if self.clock.now() > expires_at {
            sqlx::query(r"DELETE FROM admin_sessions WHERE token_hash = $1")
                .bind(&hash)
                .execute(&self.pool)
                .await
                .map_err(RepositoryError::from)?;
            return Ok(false);
        }

        Ok(true)
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        sqlx::query(r"DELETE FROM admin_sessions WHERE token_hash = $1")
            .bind(token_hash(token))
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}
