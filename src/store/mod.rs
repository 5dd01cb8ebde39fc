//! Local persistence for provider credentials and saved playlists
//!
//! Everything lives in a single TOML file. Each mutation rewrites the file
//! while holding the store lock, so writers inside one process never interleave.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{Credential, CredentialStore};
use crate::models::{CatalogItem, SavedRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse store file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    credentials: Vec<Credential>,
    #[serde(default)]
    saved: Vec<SavedRecord>,
}

/// File-backed store. A store without a path keeps everything in memory.
#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    data: Mutex<StoreData>,
}

impl Store {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content)?
        } else {
            StoreData::default()
        };

        tracing::debug!(
            "Opened store {} ({} credentials, {} saved)",
            path.display(),
            data.credentials.len(),
            data.saved.len()
        );

        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(StoreData::default()),
        }
    }

    /// Apply `f` to a copy of the data, persist it, then publish it.
    fn update<T>(&self, f: impl FnOnce(&mut StoreData) -> T) -> Result<T, StoreError> {
        let mut guard = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = guard.clone();
        let out = f(&mut next);
        if let Some(ref path) = self.path {
            write_file(path, &next)?;
        }
        *guard = next;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> T {
        let guard = self.data.lock().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Remove the record of `catalog_item_id` saved by `user_id`, returning it.
    pub fn remove_saved(
        &self,
        user_id: &str,
        catalog_item_id: &str,
    ) -> Result<Option<SavedRecord>, StoreError> {
        if !self.is_saved(user_id, catalog_item_id) {
            return Ok(None);
        }
        self.update(|data| -> Option<SavedRecord> {
            let pos = data
                .saved
                .iter()
                .position(|r| r.user_id == user_id && r.catalog_item_id == catalog_item_id)?;
            Some(data.saved.remove(pos))
        })
    }

    /// Save a snapshot of `item` for `user_id`. Returns `false` if it was
    /// already saved.
    ///
    /// A missing category is copied from any other record of the same item.
    pub fn save(
        &self,
        user_id: &str,
        item: &CatalogItem,
        category: Option<String>,
    ) -> Result<bool, StoreError> {
        self.update(|data| {
            if data
                .saved
                .iter()
                .any(|r| r.user_id == user_id && r.catalog_item_id == item.id)
            {
                return false;
            }

            let category = category.filter(|c| !c.is_empty()).or_else(|| {
                data.saved
                    .iter()
                    .filter(|r| r.catalog_item_id == item.id)
                    .find_map(|r| r.category().map(String::from))
            });

            data.saved
                .push(SavedRecord::from_item(user_id, item, category, Utc::now()));
            true
        })
    }

    pub fn is_saved(&self, user_id: &str, catalog_item_id: &str) -> bool {
        self.read(|data| {
            data.saved
                .iter()
                .any(|r| r.user_id == user_id && r.catalog_item_id == catalog_item_id)
        })
    }

    pub fn saved_records(&self) -> Vec<SavedRecord> {
        self.read(|data| data.saved.clone())
    }
}

impl CredentialStore for Store {
    fn get_credential(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<Credential>, StoreError> {
        Ok(self.read(|data| {
            data.credentials
                .iter()
                .find(|c| c.user_id == user_id && c.provider == provider)
                .cloned()
        }))
    }

    fn put_credential(&self, credential: Credential) -> Result<(), StoreError> {
        self.update(|data| {
            data.credentials
                .retain(|c| !(c.user_id == credential.user_id && c.provider == credential.provider));
            data.credentials.push(credential);
        })
    }

    fn remove_credential(&self, user_id: &str, provider: &str) -> Result<bool, StoreError> {
        self.update(|data| {
            let before = data.credentials.len();
            data.credentials
                .retain(|c| !(c.user_id == user_id && c.provider == provider));
            data.credentials.len() != before
        })
    }
}

fn write_file(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(data)?;
    fs::write(path, content).map_err(io_err)?;

    // Credentials live in this file
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).map_err(io_err)?;
    }

    Ok(())
}
