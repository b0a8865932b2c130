//! End-to-end tests for the OKAMI action router.
//!
//! [`TestApp`] drives the real axum router against in-memory stores: a
//! product catalog, an order log, the admin credential and the in-memory
//! session store, all sharing one [`ManualClock`]. Drops and media storage
//! are `mockall` mocks so each test states exactly which calls it expects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p okami-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, TimeZone, Utc};
use okami_api::db::{
    CredentialRepository, MockDropRepository, OrderRepository, ProductRepository,
    RepositoryError,
};
use okami_api::models::{NewOrder, NewProduct, Order, Product, ProductChanges};
use okami_api::services::auth::hash_password;
use okami_api::services::sessions::ManualClock;
use okami_api::services::storage::MockMediaStorage;
use okami_api::services::{MediaStorage, MemorySessionStore};
use okami_api::state::{AppState, Stores};
use okami_core::{OrderId, OrderStatus, Price, ProductCategory, ProductId};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Password the seeded admin credential verifies against.
pub const ADMIN_PASSWORD: &str = "okami-admin-2026";

/// Fixed start time for every test clock.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
}

/// Deterministic product id from a small number.
#[must_use]
pub fn product_id(n: u128) -> ProductId {
    ProductId::new(uuid::Uuid::from_u128(n))
}

/// A catalog product with the fields the validator reads.
#[must_use]
pub fn product(id: ProductId, title: &str, price: i64, stock: i32, sizes: &[&str]) -> Product {
    Product {
        id,
        title: title.to_owned(),
        price: Price::from_dinars(price),
        original_price: None,
        images: Vec::new(),
        sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
        stock,
        category: ProductCategory::Tops,
        description: None,
        drop_id: None,
        is_new: false,
        has_fire_effect: false,
        sold_out_at: None,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// In-memory stores
// =============================================================================

/// Product catalog held in a `Vec`, newest first.
#[derive(Debug, Default)]
pub struct InMemoryProducts {
    rows: Mutex<Vec<Product>>,
    deleted: Mutex<Vec<ProductId>>,
}

impl InMemoryProducts {
    #[must_use]
    pub fn new(rows: Vec<Product>) -> Self {
        Self {
            rows: Mutex::new(rows),
            deleted: Mutex::default(),
        }
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<Product> {
        lock(&self.rows).iter().find(|p| p.id == id).cloned()
    }

    /// Every id removed through `delete` or `delete_many`.
    #[must_use]
    pub fn deleted(&self) -> Vec<ProductId> {
        lock(&self.deleted).clone()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(lock(&self.rows).clone())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let mut created = product(
            ProductId::new(uuid::Uuid::new_v4()),
            &new.title,
            0,
            new.stock,
            &[],
        );
        created.price = new.price;
        created.original_price = new.original_price;
        created.images = new.images;
        created.sizes = new.sizes;
        created.category = new.category;
        created.description = new.description;
        created.drop_id = new.drop_id;
        created.is_new = new.is_new;
        created.has_fire_effect = new.has_fire_effect;

        lock(&self.rows).insert(0, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let mut rows = lock(&self.rows);
        let row = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(price) = changes.price {
            row.price = price;
        }
        if let Some(original_price) = changes.original_price {
            row.original_price = original_price;
        }
        if let Some(images) = changes.images {
            row.images = images;
        }
        if let Some(sizes) = changes.sizes {
            row.sizes = sizes;
        }
        if let Some(stock) = changes.stock {
            row.stock = stock;
        }
        if let Some(category) = changes.category {
            row.category = category;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(drop_id) = changes.drop_id {
            row.drop_id = drop_id;
        }
        if let Some(is_new) = changes.is_new {
            row.is_new = is_new;
        }
        if let Some(has_fire_effect) = changes.has_fire_effect {
            row.has_fire_effect = has_fire_effect;
        }
        if let Some(sold_out_at) = changes.sold_out_at {
            row.sold_out_at = sold_out_at;
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|p| p.id != id);
        if rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        lock(&self.deleted).push(id);
        Ok(())
    }

    async fn list_sold_out_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|p| p.stock == 0 && p.sold_out_at.is_some_and(|at| at < cutoff))
            .cloned()
            .collect())
    }

    async fn delete_many(&self, ids: Vec<ProductId>) -> Result<u64, RepositoryError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|p| !ids.contains(&p.id));
        lock(&self.deleted).extend(ids);
        Ok(u64::try_from(before - rows.len()).unwrap_or(u64::MAX))
    }
}

/// Order log.
#[derive(Debug)]
pub struct InMemoryOrders {
    rows: Mutex<Vec<Order>>,
    clock: Arc<ManualClock>,
}

impl InMemoryOrders {
    #[must_use]
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            rows: Mutex::default(),
            clock,
        }
    }

    #[must_use]
    pub fn all(&self) -> Vec<Order> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        use okami_api::services::Clock;

        let order = Order {
            id: OrderId::new(uuid::Uuid::new_v4()),
            customer_name: order.customer_name,
            phone: order.phone.into_inner(),
            wilaya: order.wilaya.as_str().to_owned(),
            delivery_type: order.delivery_type,
            items: order.items,
            total: order.total,
            status: OrderStatus::Pending,
            created_at: self.clock.now(),
        };
        lock(&self.rows).insert(0, order.clone());
        Ok(order)
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.all())
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(lock(&self.rows).iter().find(|o| o.id == id).cloned())
    }

    async fn transition_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut rows = lock(&self.rows);
        let Some(row) = rows
            .iter_mut()
            .find(|o| o.id == id && o.status.can_transition_to(status))
        else {
            return Ok(None);
        };
        row.status = status;
        Ok(Some(row.clone()))
    }
}

/// The single `admin_settings` row.
#[derive(Debug, Default)]
pub struct InMemoryCredentials {
    stored: Mutex<Option<String>>,
}

impl InMemoryCredentials {
    #[must_use]
    pub fn new(stored: Option<String>) -> Self {
        Self {
            stored: Mutex::new(stored),
        }
    }

    #[must_use]
    pub fn stored(&self) -> Option<String> {
        lock(&self.stored).clone()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentials {
    async fn password_hash(&self) -> Result<Option<String>, RepositoryError> {
        Ok(self.stored())
    }

    async fn set_password_hash(&self, password_hash: String) -> Result<(), RepositoryError> {
        *lock(&self.stored) = Some(password_hash);
        Ok(())
    }
}

// =============================================================================
// Test application
// =============================================================================

/// The router wired to in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub products: Arc<InMemoryProducts>,
    pub orders: Arc<InMemoryOrders>,
    pub credentials: Arc<InMemoryCredentials>,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    /// An app with the given catalog and a salted admin credential.
    #[must_use]
    pub fn new(catalog: Vec<Product>) -> Self {
        Self::builder()
            .catalog(catalog)
            .build()
    }

    #[must_use]
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            catalog: Vec::new(),
            credential: Some(hash_password(ADMIN_PASSWORD)),
            drops: MockDropRepository::new(),
            storage: MockMediaStorage::new(),
        }
    }

    /// Send an action and return the status and JSON body.
    pub async fn call(&self, action: &str, data: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::post("/admin").header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = json!({ "action": action, "data": data }).to_string();
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    /// Send any request to the router.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Log in with [`ADMIN_PASSWORD`] and return the session token.
    pub async fn login(&self) -> String {
        let (status, body) = self
            .call("verify_password", json!({ "password": ADMIN_PASSWORD }), None)
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_owned()
    }
}

pub struct TestAppBuilder {
    catalog: Vec<Product>,
    credential: Option<String>,
    drops: MockDropRepository,
    storage: MockMediaStorage,
}

impl TestAppBuilder {
    #[must_use]
    pub fn catalog(mut self, catalog: Vec<Product>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the stored credential verbatim (e.g. a legacy plaintext one).
    #[must_use]
    pub fn credential(mut self, stored: Option<&str>) -> Self {
        self.credential = stored.map(str::to_owned);
        self
    }

    #[must_use]
    pub fn drops(mut self, drops: MockDropRepository) -> Self {
        self.drops = drops;
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: MockMediaStorage) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn build(self) -> TestApp {
        let clock = Arc::new(ManualClock::new(epoch()));
        let products = Arc::new(InMemoryProducts::new(self.catalog));
        let orders = Arc::new(InMemoryOrders::new(Arc::clone(&clock)));
        let credentials = Arc::new(InMemoryCredentials::new(self.credential));
        let sessions = Arc::new(MemorySessionStore::with_clock(clock.clone()));
        let storage: Arc<dyn MediaStorage> = Arc::new(self.storage);

        let stores = Stores {
            products: products.clone(),
            drops: Arc::new(self.drops),
            orders: orders.clone(),
            credentials: credentials.clone(),
            sessions: sessions.clone(),
            storage,
        };
        let state = AppState::new(stores, "media", clock.clone(), None);

        TestApp {
            router: okami_api::app(state),
            clock,
            products,
            orders,
            credentials,
            sessions,
        }
    }
}
