//! Catalog maintenance: product updates, sold-out cleanup and the public
//! storefront view.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use okami_core::ProductId;
use serde::Serialize;

use super::sessions::Clock;
use super::storage::{MediaStorage, object_path};
use crate::db::{DropRepository, ProductRepository, RepositoryError};
use crate::models::{Drop, Product, ProductChanges};

/// How long a sold-out product stays listed before cleanup removes it.
pub const SOLD_OUT_RETENTION: TimeDelta = TimeDelta::hours(24);

/// What the storefront renders: visible products plus the current drop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Storefront {
    pub products: Vec<Product>,
    pub active_drop: Option<Drop>,
}

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    drops: Arc<dyn DropRepository>,
    storage: Arc<dyn MediaStorage>,
    bucket: String,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        drops: Arc<dyn DropRepository>,
        storage: Arc<dyn MediaStorage>,
        bucket: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            drops,
            storage,
            bucket: bucket.into(),
            clock,
        }
    }

    /// Apply a partial update, stamping or clearing `sold_out_at` when the
    /// stock changes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or a database error.
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let changes = changes.with_sold_out_stamp(self.clock.now());
        self.products.update(id, changes).await
    }

    /// Delete products that have been sold out for longer than
    /// [`SOLD_OUT_RETENTION`], along with their images in the media bucket.
    ///
    /// Image removal is best effort: a storage failure is logged and the
    /// products are deleted anyway. Returns the number of products removed.
    ///
    /// # Errors
    ///
    /// Returns a database error from the lookup or the delete.
    pub async fn cleanup_sold_out(&self) -> Result<u64, RepositoryError> {
        let cutoff = self.clock.now() - SOLD_OUT_RETENTION;
        let expired = self.products.list_sold_out_before(cutoff).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let paths: Vec<String> = expired
            .iter()
            .flat_map(|product| product.images.iter())
            .filter_map(|url| object_path(url, &self.bucket))
            .collect();

        if !paths.is_empty() {
            let image_count = paths.len();
            if let Err(e) = self.storage.remove(paths).await {
                tracing::warn!(error = %e, image_count, "Failed to remove sold-out product images");
            }
        }

        let ids = expired.iter().map(|product| product.id).collect();
        let cleaned = self.products.delete_many(ids).await?;

        tracing::info!(cleaned, cutoff = %cutoff, "Removed sold-out products");
        Ok(cleaned)
    }

    /// Products a shopper may see right now, plus the active drop.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn storefront(&self) -> Result<Storefront, RepositoryError> {
        let products = self.products.list().await?;
        let drops = self.drops.list().await?;
        Ok(storefront_view(products, drops, self.clock.now()))
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

/// Apply drop visibility to a product listing.
///
/// The active drop is the first active one in `drops` (newest first). Until
/// it is released its products are hidden; otherwise everything is shown.
#[must_use]
pub fn storefront_view(products: Vec<Product>, drops: Vec<Drop>, now: DateTime<Utc>) -> Storefront {
    let active_drop = drops.iter().find(|drop| drop.is_active).cloned();

    let products = match &active_drop {
        Some(drop) if !drop.is_released(now) => products
            .into_iter()
            .filter(|product| product.drop_id != Some(drop.id))
            .collect(),
        _ => products,
    };

    Storefront {
        products,
        active_drop,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::{MockDropRepository, MockProductRepository};
    use crate::services::sessions::ManualClock;
    use crate::services::storage::{MockMediaStorage, StorageError};
    use chrono::TimeZone;
    use okami_core::{BackgroundType, DropId, Price, ProductCategory};
    use testresult::TestResult;

    const BUCKET: &str = "media";
    const MEDIA_URL: &str = "https://abc.supabase.co/storage/v1/object/public/media/";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn product(drop_id: Option<DropId>, images: &[&str]) -> Product {
        Product {
            id: ProductId::new(uuid::Uuid::new_v4()),
            title: "Kitsune Tee".to_string(),
            price: Price::from_dinars(2500),
            original_price: None,
            images: images.iter().map(ToString::to_string).collect(),
            sizes: vec!["m".to_string()],
            stock: 0,
            category: ProductCategory::Tops,
            description: None,
            drop_id,
            is_new: false,
            has_fire_effect: false,
            sold_out_at: Some(now() - TimeDelta::hours(30)),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn drop(is_active: bool, release_date: DateTime<Utc>) -> Drop {
        Drop {
            id: DropId::new(uuid::Uuid::new_v4()),
            name: "Ronin".to_string(),
            release_date,
            lookbook_images: Vec::new(),
            background_url: None,
            background_type: BackgroundType::Image,
            is_active,
            global_fire_effect: false,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn service(
        products: MockProductRepository,
        drops: MockDropRepository,
        storage: MockMediaStorage,
    ) -> CatalogService {
        CatalogService::new(
            Arc::new(products),
            Arc::new(drops),
            Arc::new(storage),
            BUCKET,
            Arc::new(ManualClock::new(now())),
        )
    }

    #[tokio::test]
    async fn test_cleanup_with_nothing_eligible_touches_nothing() -> TestResult {
        let mut products = MockProductRepository::new();
        products
            .expect_list_sold_out_before()
            .withf(|cutoff| *cutoff == now() - SOLD_OUT_RETENTION)
            .once()
            .returning(|_| Ok(Vec::new()));
        products.expect_delete_many().never();
        let mut storage = MockMediaStorage::new();
        storage.expect_remove().never();

        let cleaned = service(products, MockDropRepository::new(), storage)
            .cleanup_sold_out()
            .await?;

        assert_eq!(cleaned, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cleanup_removes_bucket_images_then_products() -> TestResult {
        let bucket_image = format!("{MEDIA_URL}uploads/a.jpg");
        let expired = vec![
            product(None, &[&bucket_image, "https://cdn.example.net/b.jpg"]),
            product(None, &[]),
        ];
        let ids: Vec<ProductId> = expired.iter().map(|p| p.id).collect();

        let mut products = MockProductRepository::new();
        products
            .expect_list_sold_out_before()
            .once()
            .returning(move |_| Ok(expired.clone()));
        products
            .expect_delete_many()
            .withf(move |deleted| *deleted == ids)
            .once()
            .returning(|_| Ok(2));
        let mut storage = MockMediaStorage::new();
        storage
            .expect_remove()
            .withf(|paths| paths == &["uploads/a.jpg".to_string()])
            .once()
            .returning(|_| Ok(()));

        let cleaned = service(products, MockDropRepository::new(), storage)
            .cleanup_sold_out()
            .await?;

        assert_eq!(cleaned, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_cleanup_survives_storage_failure() -> TestResult {
        let image = format!("{MEDIA_URL}uploads/a.jpg");
        let expired = vec![product(None, &[&image])];

        let mut products = MockProductRepository::new();
        products
            .expect_list_sold_out_before()
            .returning(move |_| Ok(expired.clone()));
        products.expect_delete_many().once().returning(|_| Ok(1));
        let mut storage = MockMediaStorage::new();
        storage.expect_remove().once().returning(|_| {
            Err(StorageError::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        });

        let cleaned = service(products, MockDropRepository::new(), storage)
            .cleanup_sold_out()
            .await?;

        assert_eq!(cleaned, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_stamps_sold_out() -> TestResult {
        let mut products = MockProductRepository::new();
        products
            .expect_update()
            .withf(|_, changes| changes.sold_out_at == Some(Some(now())))
            .once()
            .returning(|_, _| Ok(product(None, &[])));

        let changes = ProductChanges {
            stock: Some(0),
            ..ProductChanges::default()
        };
        service(products, MockDropRepository::new(), MockMediaStorage::new())
            .update_product(ProductId::new(uuid::Uuid::nil()), changes)
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_restock_clears_stamp() -> TestResult {
        let mut products = MockProductRepository::new();
        products
            .expect_update()
            .withf(|_, changes| changes.sold_out_at == Some(None))
            .once()
            .returning(|_, _| Ok(product(None, &[])));

        let changes = ProductChanges {
            stock: Some(4),
            ..ProductChanges::default()
        };
        service(products, MockDropRepository::new(), MockMediaStorage::new())
            .update_product(ProductId::new(uuid::Uuid::nil()), changes)
            .await?;
        Ok(())
    }

    #[test]
    fn test_storefront_hides_unreleased_drop_products() {
        let upcoming = drop(true, now() + TimeDelta::days(2));
        let listed = vec![product(Some(upcoming.id), &[]), product(None, &[])];

        let view = storefront_view(listed, vec![upcoming.clone()], now());

        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].drop_id, None);
        assert_eq!(view.active_drop.map(|d| d.id), Some(upcoming.id));
    }

    #[test]
    fn test_storefront_shows_everything_once_released() {
        let released = drop(true, now() - TimeDelta::hours(1));
        let listed = vec![product(Some(released.id), &[]), product(None, &[])];

        let view = storefront_view(listed, vec![released], now());

        assert_eq!(view.products.len(), 2);
    }

    #[test]
    fn test_storefront_without_active_drop_shows_past_drop_products() {
        let past = drop(false, now() - TimeDelta::days(10));
        let listed = vec![product(Some(past.id), &[]), product(None, &[])];

        let view = storefront_view(listed, vec![past], now());

        assert_eq!(view.products.len(), 2);
        assert!(view.active_drop.is_none());
    }

    #[test]
    fn test_storefront_uses_newest_active_drop() {
        let newest = drop(true, now() + TimeDelta::days(1));
        let older = drop(true, now() - TimeDelta::days(1));
        let listed = vec![product(Some(older.id), &[]), product(Some(newest.id), &[])];

        let view = storefront_view(listed, vec![newest.clone(), older.clone()], now());

        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].drop_id, Some(older.id));
    }
}
