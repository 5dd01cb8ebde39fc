//! Track models

use serde::Serialize;

use super::Image;

/// Track artist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
}

/// Album a track belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: Option<String>,
    pub images: Vec<Image>,
}

/// Canonical track shape, independent of how the upstream nested it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub duration_ms: u64,
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    pub external_url: Option<String>,
    pub preview_url: Option<String>,
}

impl Track {
    /// Artist names joined for display.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
