//! Data models for catalog and saved-playlist entities

mod playlist;
mod saved;
mod track;

pub use playlist::*;
pub use saved::*;
pub use track::*;
