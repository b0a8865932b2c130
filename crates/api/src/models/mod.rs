//! Domain models for the catalog, drops and orders.
//!
//! Entities serialize with their column names (snake_case), which is the shape
//! the admin client reads back. Inputs coming from the client are camelCase and
//! live next to the entity they create or patch.

pub mod drop;
pub mod order;
pub mod product;

pub use drop::{Drop, DropChanges, NewDrop};
pub use order::{NewOrder, Order, OrderDraft, OrderLine, OrderedProduct};
pub use product::{NewProduct, Product, ProductChanges};

use serde::{Deserialize, Deserializer};

/// Deserialize a patch field where `null` means "clear" and absence means
/// "leave unchanged". Use together with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize an optional string where blank counts as absent.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(non_blank))
}

/// Deserialize an optional id where `""` and `null` both mean "no id".
pub(crate) fn optional_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.and_then(non_blank) {
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Patch variant of [`optional_id`]: absent stays `None`, `null`/`""` clears.
pub(crate) fn nullable_id<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_id(deserializer).map(Some)
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_owned())
    }
}
