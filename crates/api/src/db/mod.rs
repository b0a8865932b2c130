//! Database access for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `products` - Catalog, including sold-out bookkeeping
//! - `drops` - Scheduled releases and their countdown styling
//! - `orders` - Validated checkout submissions (line items as JSONB)
//! - `admin_settings` - The single admin credential row
//! - `admin_sessions` - Durable admin sessions (`SESSION_BACKEND=postgres`)
//!
//! Every repository is a trait so the services and the action router can be
//! exercised against `mockall` mocks; the `Pg*` types are the production
//! implementations.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p okami-cli -- migrate
//! ```

pub mod admin_settings;
pub mod drops;
pub mod orders;
pub mod products;
pub mod sessions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_settings::{CredentialRepository, MockCredentialRepository, PgCredentialRepository};
pub use drops::{DropRepository, MockDropRepository, PgDropRepository};
pub use orders::{MockOrderRepository, OrderRepository, PgOrderRepository};
pub use products::{MockProductRepository, PgProductRepository, ProductRepository};
pub use sessions::PgSessionStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
