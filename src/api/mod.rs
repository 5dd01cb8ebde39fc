//! Catalog API access, aggregation, and the commands built on them

pub mod aggregate;
mod account;
pub mod catalog;
pub mod client;
mod normalize;
mod playlists;
mod saved;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::auth::{oauth::build_client, AppTokenCache, Endpoints, TokenRefresher};
use crate::config::Config;
use crate::store::Store;
use client::ProviderClient;

/// Everything a command needs, wired once per process.
pub struct Context {
    pub config: Config,
    pub store: Arc<Store>,
    pub client: ProviderClient,
    pub refresher: TokenRefresher,
    /// Print results as JSON instead of text
    pub json: bool,
}

impl Context {
    /// Load config, open the store, and build the clients.
    pub fn load(json: bool) -> Result<Self> {
        let config = Config::load()?;
        let store_path = config.store_path()?;
        let store = Arc::new(
            Store::open(&store_path)
                .with_context(|| format!("Failed to open store {}", store_path.display()))?,
        );

        let endpoints = Endpoints::from(&config);
        let oauth = build_client(&config.client_credentials()?, &endpoints)
            .context("Failed to build OAuth client")?;

        let client = ProviderClient::new(
            oauth.clone(),
            &endpoints,
            &config.market,
            Arc::new(AppTokenCache::new()),
        );
        let refresher = TokenRefresher::new(store.clone(), oauth);

        Ok(Self {
            config,
            store,
            client,
            refresher,
            json,
        })
    }

    /// Client acting as `user_id` when connected, as the app otherwise.
    pub async fn client_for(&self, user_id: Option<&str>) -> ProviderClient {
        self.client.for_user(&self.refresher, user_id).await
    }
}

/// Print `value` as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to encode JSON output")?;
    println!("{}", out);
    Ok(())
}

/// Store a provider credential for a user
pub fn connect(
    ctx: &Context,
    user_id: &str,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_in: Option<u64>,
) -> Result<()> {
    account::connect(ctx, user_id, access_token, refresh_token, expires_in)
}

/// Remove a user's provider credential
pub fn disconnect(ctx: &Context, user_id: &str) -> Result<()> {
    account::disconnect(ctx, user_id)
}

/// Ensure a user's token is usable, refreshing if needed
pub async fn token_status(ctx: &Context, user_id: &str) -> Result<()> {
    account::token_status(ctx, user_id).await
}

/// Search playlists
pub async fn search(ctx: &Context, query: &str, limit: usize) -> Result<()> {
    playlists::search(ctx, query, limit).await
}

/// Show a playlist with its tracks
pub async fn show_playlist(ctx: &Context, id: &str, user_id: Option<&str>) -> Result<()> {
    playlists::show_playlist(ctx, id, user_id).await
}

/// List a playlist's tracks
pub async fn list_tracks(
    ctx: &Context,
    id: &str,
    limit: usize,
    user_id: Option<&str>,
) -> Result<()> {
    playlists::list_tracks(ctx, id, limit, user_id).await
}

/// List a connected user's own playlists
pub async fn my_playlists(ctx: &Context, user_id: &str, limit: usize) -> Result<()> {
    playlists::my_playlists(ctx, user_id, limit).await
}

/// Featured playlists
pub async fn featured(ctx: &Context, limit: usize) -> Result<()> {
    playlists::featured(ctx, limit).await
}

/// List browse categories
pub fn list_categories(limit: usize, json: bool) -> Result<()> {
    playlists::list_categories(limit, json)
}

/// Playlists for a browse category
pub async fn category(ctx: &Context, category_id: &str, limit: usize) -> Result<()> {
    playlists::category(ctx, category_id, limit).await
}

/// Save or unsave a playlist
pub async fn toggle_save(
    ctx: &Context,
    user_id: &str,
    playlist_id: &str,
    category: Option<String>,
) -> Result<()> {
    saved::toggle_save(ctx, user_id, playlist_id, category).await?;
    Ok(())
}

/// Most-saved playlists
pub fn popular(ctx: &Context, category: Option<&str>, limit: usize) -> Result<()> {
    saved::popular(ctx, category, limit)
}
