//! Saved-playlist models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CatalogItem;

/// A user's local bookmark of a catalog playlist.
///
/// Records are created on save and deleted on unsave; they are never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecord {
    pub id: String,
    pub user_id: String,
    pub catalog_item_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub owner_name: Option<String>,
    pub track_count: u32,
    pub external_url: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SavedRecord {
    /// Snapshot a catalog item into a new record for `user_id`.
    pub fn from_item(
        user_id: &str,
        item: &CatalogItem,
        category: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            catalog_item_id: item.id.clone(),
            name: item.name.clone(),
            description: Some(item.description.clone()).filter(|d| !d.is_empty()),
            image_url: item.image_url().map(String::from),
            owner_name: Some(item.owner.display_name.clone()).filter(|n| !n.is_empty()),
            track_count: item.tracks.total,
            external_url: item.external_url.clone(),
            category: category.filter(|c| !c.is_empty()),
            created_at,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Category, treating an empty string as absent.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Outcome of a save toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAction {
    Saved,
    Removed,
}

/// One row of the popularity leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularEntry {
    pub catalog_item_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub owner_name: Option<String>,
    pub track_count: u32,
    pub external_url: Option<String>,
    pub category: Option<String>,
    pub save_count: usize,
}

/// Number of distinct saved playlists carrying a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}
