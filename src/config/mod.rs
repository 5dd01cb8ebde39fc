//! Configuration loading

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::auth::ClientCredentials;

const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuth client ID (overridden by `SPOTIFY_CLIENT_ID`)
    pub client_id: Option<String>,
    /// OAuth client secret (overridden by `SPOTIFY_CLIENT_SECRET`)
    pub client_secret: Option<String>,
    /// Market passed to catalog requests
    pub market: String,
    /// Accounts service base URL (token endpoint lives at `/api/token`)
    pub accounts_url: String,
    /// Catalog API base URL
    pub api_url: String,
    /// Search queries merged for the featured list
    pub featured_queries: Vec<String>,
    /// Store file location; defaults to the platform data directory
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            market: "TR".to_string(),
            accounts_url: "https://accounts.spotify.com".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            featured_queries: vec![
                "top hits 2026".to_string(),
                "popular music playlist".to_string(),
                "trending playlist türkiye".to_string(),
            ],
            store_path: None,
        }
    }
}

impl Config {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "playlist-hub", "playlist-hub")
            .context("Could not determine config directory")
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration from disk, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).context("Failed to read config file")?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(id) = var(ENV_CLIENT_ID).filter(|v| !v.is_empty()) {
            self.client_id = Some(id);
        }
        if let Some(secret) = var(ENV_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            self.client_secret = Some(secret);
        }
    }

    /// Client credentials for the token endpoint.
    pub fn client_credentials(&self) -> Result<ClientCredentials> {
        let client_id = self.client_id.clone().with_context(|| {
            format!(
                "Missing client ID. Set {} or client_id in config.toml",
                ENV_CLIENT_ID
            )
        })?;
        let client_secret = self.client_secret.clone().with_context(|| {
            format!(
                "Missing client secret. Set {} or client_secret in config.toml",
                ENV_CLIENT_SECRET
            )
        })?;
        Ok(ClientCredentials {
            client_id,
            client_secret,
        })
    }

    /// Store file path, from config or the platform data directory.
    pub fn store_path(&self) -> Result<PathBuf> {
        match self.store_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("store.toml")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("market = \"US\"\n").unwrap();
        assert_eq!(config.market, "US");
        assert_eq!(config.api_url, "https://api.spotify.com/v1");
        assert_eq!(config.featured_queries.len(), 3);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config =
            Config::parse("client_id = \"file-id\"\nclient_secret = \"file-secret\"\n").unwrap();
        config.apply_env(|key| match key {
            ENV_CLIENT_ID => Some("env-id".to_string()),
            ENV_CLIENT_SECRET => Some(String::new()),
            _ => None,
        });

        let creds = config.client_credentials().unwrap();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.client_secret, "file-secret");
    }

    #[test]
    fn test_missing_credentials_is_error() {
        let config = Config::default();
        let err = config.client_credentials().unwrap_err();
        assert!(format!("{:#}", err).contains(ENV_CLIENT_ID));
    }

    #[test]
    fn test_explicit_store_path() {
        let config = Config::parse("store_path = \"/tmp/hub/store.toml\"\n").unwrap();
        assert_eq!(
            config.store_path().unwrap(),
            PathBuf::from("/tmp/hub/store.toml")
        );
    }
}
