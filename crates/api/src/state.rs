//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{ApiConfig, SessionBackend};
use crate::db::{
    CredentialRepository, DropRepository, OrderRepository, PgCredentialRepository,
    PgDropRepository, PgOrderRepository, PgProductRepository, PgSessionStore, ProductRepository,
};
use crate::services::{
    CatalogService, Clock, CredentialService, DisabledStorage, MediaStorage, MemorySessionStore,
    OrderValidator, SessionStore, StorageError, SupabaseStorage, SystemClock,
};

/// The storage seams behind the router. Production wires the `Pg*`
/// repositories; tests substitute mocks.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductRepository>,
    pub drops: Arc<dyn DropRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub credentials: Arc<dyn CredentialRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub storage: Arc<dyn MediaStorage>,
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    credentials: CredentialService,
    orders: OrderValidator,
    catalog: CatalogService,
    pool: Option<PgPool>,
}

impl AppState {
    /// Build state from explicit stores.
    ///
    /// `pool` is only used by the readiness probe; pass `None` when the
    /// stores are not database-backed.
    #[must_use]
    pub fn new(
        stores: Stores,
        media_bucket: &str,
        clock: Arc<dyn Clock>,
        pool: Option<PgPool>,
    ) -> Self {
        let credentials = CredentialService::new(Arc::clone(&stores.credentials));
        let orders = OrderValidator::new(Arc::clone(&stores.products), Arc::clone(&stores.orders));
        let catalog = CatalogService::new(
            Arc::clone(&stores.products),
            Arc::clone(&stores.drops),
            Arc::clone(&stores.storage),
            media_bucket,
            clock,
        );

        Self {
            inner: Arc::new(AppStateInner {
                stores,
                credentials,
                orders,
                catalog,
                pool,
            }),
        }
    }

    /// Wire the production stores on top of a database pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage HTTP client cannot be built.
    pub fn from_pool(config: &ApiConfig, pool: PgPool) -> Result<Self, StorageError> {
        let sessions: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
            SessionBackend::Postgres => Arc::new(PgSessionStore::new(pool.clone())),
        };

        let storage: Arc<dyn MediaStorage> = match config.storage() {
            Some(storage) => Arc::new(SupabaseStorage::new(storage, &config.media_bucket)?),
            None => {
                tracing::warn!("Media storage not configured; uploads and image cleanup disabled");
                Arc::new(DisabledStorage)
            }
        };

        let stores = Stores {
            products: Arc::new(PgProductRepository::new(pool.clone())),
            drops: Arc::new(PgDropRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            credentials: Arc::new(PgCredentialRepository::new(pool.clone())),
            sessions,
            storage,
        };

        Ok(Self::new(
            stores,
            &config.media_bucket,
            Arc::new(SystemClock),
            Some(pool),
        ))
    }

    #[must_use]
    pub fn products(&self) -> &dyn ProductRepository {
        self.inner.stores.products.as_ref()
    }

    #[must_use]
    pub fn drops(&self) -> &dyn DropRepository {
        self.inner.stores.drops.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderRepository {
        self.inner.stores.orders.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.inner.stores.sessions.as_ref()
    }

    #[must_use]
    pub fn storage(&self) -> &dyn MediaStorage {
        self.inner.stores.storage.as_ref()
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialService {
        &self.inner.credentials
    }

    #[must_use]
    pub fn order_validator(&self) -> &OrderValidator {
        &self.inner.orders
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Database pool, when the state is database-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
