//! Scheduled product drops.

use chrono::{DateTime, Utc};
use okami_core::{BackgroundType, DropId};
use serde::{Deserialize, Serialize};

use super::{blank_as_none, nullable};

/// A timed product release with its countdown styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drop {
    pub id: DropId,
    pub name: String,
    pub release_date: DateTime<Utc>,
    pub lookbook_images: Vec<String>,
    pub background_url: Option<String>,
    pub background_type: BackgroundType,
    pub is_active: bool,
    pub global_fire_effect: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Drop {
    /// Whether the countdown has run out at `now`.
    #[must_use]
    pub fn is_released(&self, now: DateTime<Utc>) -> bool {
        now >= self.release_date
    }
}

/// Input for `create_drop`. New drops are always created active.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDrop {
    pub name: String,
    pub release_date: DateTime<Utc>,
    #[serde(default)]
    pub lookbook_images: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub background_url: Option<String>,
    #[serde(default)]
    pub background_type: BackgroundType,
    #[serde(default)]
    pub global_fire_effect: bool,
}

impl NewDrop {
    /// # Errors
    ///
    /// Returns a message if the name is blank.
    pub fn validate(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_owned();
        if self.name.is_empty() {
            return Err("drop name is required".to_owned());
        }
        Ok(self)
    }
}

/// Input for `update_drop`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropChanges {
    pub name: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub lookbook_images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub background_url: Option<Option<String>>,
    pub background_type: Option<BackgroundType>,
    pub is_active: Option<bool>,
    pub global_fire_effect: Option<bool>,
}

impl DropChanges {
    /// # Errors
    ///
    /// Returns a message if a new name is blank.
    pub fn validate(mut self) -> Result<Self, String> {
        if let Some(name) = self.name.take() {
            let name = name.trim().to_owned();
            if name.is_empty() {
                return Err("drop name is required".to_owned());
            }
            self.name = Some(name);
        }
        Ok(self)
    }
}
