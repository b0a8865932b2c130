//! Catalog products.

use chrono::{DateTime, Utc};
use okami_core::{DropId, Price, ProductCategory, ProductId};
use serde::{Deserialize, Serialize};

use super::{blank_as_none, nullable, nullable_id, optional_id};

/// A product as stored in the catalog.
///
/// This is the ground truth the order validator prices against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub stock: i32,
    pub category: ProductCategory,
    pub description: Option<String>,
    pub drop_id: Option<DropId>,
    pub is_new: bool,
    pub has_fire_effect: bool,
    /// Set when stock reached zero through an admin update.
    pub sold_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `size` is one of the sizes this product is sold in.
    #[must_use]
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Whether at least `quantity` units are in stock.
    #[must_use]
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        u32::try_from(self.stock).is_ok_and(|stock| stock >= quantity)
    }
}

/// Input for `add_product`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    pub category: ProductCategory,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub drop_id: Option<DropId>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub has_fire_effect: bool,
}

impl NewProduct {
    /// Check field ranges and normalize the title.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message for the first invalid field.
    pub fn validate(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_owned();
        if self.title.is_empty() {
            return Err("product title is required".to_owned());
        }
        check_price(self.price)?;
        if let Some(original) = self.original_price {
            check_price(original)?;
        }
        check_stock(self.stock)?;
        Ok(self)
    }
}

/// Input for `update_product`.
///
/// Absent fields are left unchanged. `originalPrice`, `description` and
/// `dropId` accept `null` to clear the column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub title: Option<String>,
    pub price: Option<Price>,
    #[serde(default, deserialize_with = "nullable")]
    pub original_price: Option<Option<Price>>,
    pub images: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub stock: Option<i32>,
    pub category: Option<ProductCategory>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_id")]
    pub drop_id: Option<Option<DropId>>,
    pub is_new: Option<bool>,
    pub has_fire_effect: Option<bool>,
    /// Derived from `stock`, never read from the client.
    #[serde(skip)]
    pub sold_out_at: Option<Option<DateTime<Utc>>>,
}

impl ProductChanges {
    /// Apply the sold-out bookkeeping: a stock of zero stamps `sold_out_at`,
    /// any positive stock clears it.
    #[must_use]
    pub fn with_sold_out_stamp(mut self, now: DateTime<Utc>) -> Self {
        self.sold_out_at = match self.stock {
            Some(0) => Some(Some(now)),
            Some(stock) if stock > 0 => Some(None),
            _ => None,
        };
        self
    }

    /// # Errors
    ///
    /// Returns a client-facing message for the first invalid field.
    pub fn validate(mut self) -> Result<Self, String> {
        if let Some(title) = self.title.take() {
            let title = title.trim().to_owned();
            if title.is_empty() {
                return Err("product title is required".to_owned());
            }
            self.title = Some(title);
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(Some(original)) = self.original_price {
            check_price(original)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        Ok(self)
    }
}

fn check_price(price: Price) -> Result<(), String> {
    if price.is_negative() {
        return Err("price must not be negative".to_owned());
    }
    Ok(())
}

fn check_stock(stock: i32) -> Result<(), String> {
    if stock < 0 {
        return Err("stock must not be negative".to_owned());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_product_defaults() {
        let product: NewProduct = serde_json::from_value(json!({
            "title": "  Oni Hoodie ",
            "price": 4500,
            "category": "outerwear",
            "dropId": "",
            "description": "   "
        }))
        .unwrap();
        let product = product.validate().unwrap();

        assert_eq!(product.title, "Oni Hoodie");
        assert_eq!(product.stock, 0);
        assert!(product.images.is_empty());
        assert_eq!(product.drop_id, None);
        assert_eq!(product.description, None);
        assert!(!product.is_new);
    }

    #[test]
    fn test_new_product_rejects_negative_stock() {
        let product: NewProduct = serde_json::from_value(json!({
            "title": "Tee",
            "price": 1000,
            "stock": -1,
            "category": "tops"
        }))
        .unwrap();
        assert_eq!(product.validate().unwrap_err(), "stock must not be negative");
    }

    #[test]
    fn test_changes_distinguish_null_from_absent() {
        let changes: ProductChanges = serde_json::from_value(json!({
            "originalPrice": null,
            "title": "Tee"
        }))
        .unwrap();

        assert_eq!(changes.original_price, Some(None));
        assert_eq!(changes.description, None);
        assert_eq!(changes.drop_id, None);
    }

    #[test]
    fn test_changes_blank_drop_id_clears() {
        let changes: ProductChanges = serde_json::from_value(json!({ "dropId": "" })).unwrap();
        assert_eq!(changes.drop_id, Some(None));
    }

    #[test]
    fn test_sold_out_stamp() {
        let now = Utc::now();

        let zero = ProductChanges {
            stock: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.with_sold_out_stamp(now).sold_out_at, Some(Some(now)));

        let restocked = ProductChanges {
            stock: Some(4),
            ..Default::default()
        };
        assert_eq!(restocked.with_sold_out_stamp(now).sold_out_at, Some(None));

        let untouched = ProductChanges::default();
        assert_eq!(untouched.with_sold_out_stamp(now).sold_out_at, None);
    }

    #[test]
    fn test_sold_out_at_is_not_client_settable() {
        let changes: ProductChanges =
            serde_json::from_value(json!({ "soldOutAt": "2026-01-01T00:00:00Z" })).unwrap();
        assert_eq!(changes.sold_out_at, None);
    }
}
