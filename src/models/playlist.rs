//! Catalog playlist models

use serde::Serialize;

/// Image attached to a playlist or album
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// Playlist owner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Owner {
    pub id: String,
    pub display_name: String,
}

/// Reference to a playlist's track collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackSummary {
    pub total: u32,
    pub href: String,
}

/// A playlist as returned by the catalog API, normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<Image>,
    pub owner: Owner,
    pub tracks: TrackSummary,
    pub external_url: Option<String>,
}

impl CatalogItem {
    /// URL of the first (largest) image, if any.
    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }
}

/// Playlist page: metadata plus the tracks embedded in the same response.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistDetail {
    pub playlist: CatalogItem,
    pub tracks: Vec<super::Track>,
}

/// Browse category (genre)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
}
