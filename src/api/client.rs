//! Authenticated HTTP client for the catalog API
//!
//! Wraps reqwest::Client with bearer token injection. Requests run either as
//! a user (token supplied by the caller) or as the application, using a
//! client-credentials token from the shared [`AppTokenCache`].

use std::sync::Arc;

use chrono::Utc;
use oauth2::basic::BasicClient;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::normalize::{
    normalize_page, normalize_playlist, normalize_playlist_page, RawPlaylist, RawPlaylistPage,
    RawSearch, RawTrackPage,
};
use crate::auth::{fetch_app_token, AppToken, AppTokenCache, AuthError, Endpoints, TokenRefresher};
use crate::models::{CatalogItem, PlaylistDetail, Track};

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_APP_TOKEN_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-2xx response from the catalog API
    #[error("provider returned {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("invalid API URL {0}")]
    InvalidUrl(String),
    #[error("application token unavailable: {0}")]
    AppToken(#[from] AuthError),
    #[error("this request needs a user token")]
    UserTokenRequired,
}

/// How requests authenticate.
#[derive(Debug, Clone, PartialEq)]
pub enum Auth {
    /// Token from a connected user account
    User(String),
    /// Client-credentials token
    App,
}

/// Stateless catalog client; cheap to clone.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    oauth: BasicClient,
    api_url: String,
    market: String,
    app_tokens: Arc<AppTokenCache>,
    auth: Auth,
}

impl ProviderClient {
    /// Build an app-scoped client.
    pub fn new(
        oauth: BasicClient,
        endpoints: &Endpoints,
        market: &str,
        app_tokens: Arc<AppTokenCache>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            oauth,
            api_url: endpoints.api_url.clone(),
            market: market.to_string(),
            app_tokens,
            auth: Auth::App,
        }
    }

    /// Same client, authenticating as a user.
    pub fn with_user_token(&self, token: String) -> Self {
        Self {
            auth: Auth::User(token),
            ..self.clone()
        }
    }

    /// User-scoped client if `user_id` has a usable credential, app-scoped otherwise.
    pub async fn for_user(&self, refresher: &TokenRefresher, user_id: Option<&str>) -> Self {
        let Some(user_id) = user_id else {
            return self.clone();
        };
        match refresher.ensure_valid_access_token(user_id).await {
            Some(token) => self.with_user_token(token),
            None => {
                tracing::debug!("User {} not connected, using app credentials", user_id);
                self.clone()
            }
        }
    }

    async fn bearer_token(&self) -> Result<String, ProviderError> {
        match self.auth {
            Auth::User(ref token) => Ok(token.clone()),
            Auth::App => self.app_token_at(Utc::now().timestamp_millis()).await,
        }
    }

    /// Cached app token, fetching a new one when missing or expired.
    async fn app_token_at(&self, now_ms: i64) -> Result<String, ProviderError> {
        if let Some(token) = self.app_tokens.get(now_ms) {
            return Ok(token);
        }

        let (token, expires_in) = fetch_app_token(&self.oauth).await?;
        let secs = expires_in.unwrap_or(DEFAULT_APP_TOKEN_SECS);
        self.app_tokens
            .set(AppToken::new(token.clone(), secs, now_ms));
        tracing::debug!("Cached app token for {}s", secs);
        Ok(token)
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ProviderError> {
        let invalid = || ProviderError::InvalidUrl(self.api_url.clone());
        let mut url = Url::parse(&self.api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let token = self.bearer_token().await?;
        tracing::debug!("Catalog GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                url: url.to_string(),
                source,
            })?;

        let resp = check_response(resp, &url).await?;
        resp.json().await.map_err(|source| ProviderError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Search playlists.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>, ProviderError> {
        let limit = limit.to_string();
        let url = self.endpoint(
            &["search"],
            &[
                ("q", query),
                ("type", "playlist"),
                ("limit", limit.as_str()),
                ("market", self.market.as_str()),
            ],
        )?;
        let data: RawSearch = self.get_json(url).await?;
        Ok(data
            .playlists
            .map(normalize_playlist_page)
            .unwrap_or_default())
    }

    /// Playlist metadata together with the tracks embedded in the response.
    pub async fn get_playlist_detail(&self, id: &str) -> Result<PlaylistDetail, ProviderError> {
        let url = self.endpoint(&["playlists", id], &[("market", self.market.as_str())])?;
        let raw: RawPlaylist = self.get_json(url.clone()).await?;
        normalize_playlist(raw).ok_or_else(|| ProviderError::Malformed {
            url: url.to_string(),
            reason: "playlist has no id".to_string(),
        })
    }

    /// Playlist metadata.
    pub async fn get_by_id(&self, id: &str) -> Result<CatalogItem, ProviderError> {
        Ok(self.get_playlist_detail(id).await?.playlist)
    }

    /// Tracks of a playlist, up to `limit`.
    pub async fn get_tracks(&self, id: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let limit = limit.to_string();
        let url = self.endpoint(
            &["playlists", id, "tracks"],
            &[("limit", limit.as_str()), ("market", self.market.as_str())],
        )?;
        let page: RawTrackPage = self.get_json(url).await?;
        Ok(normalize_page(page).1)
    }

    /// Playlists of the authenticated user.
    pub async fn user_playlists(&self, limit: usize) -> Result<Vec<CatalogItem>, ProviderError> {
        if self.auth == Auth::App {
            return Err(ProviderError::UserTokenRequired);
        }
        let limit = limit.to_string();
        let url = self.endpoint(&["me", "playlists"], &[("limit", limit.as_str())])?;
        let page: RawPlaylistPage = self.get_json(url).await?;
        Ok(normalize_playlist_page(page))
    }
}

/// Map non-2xx responses to [`ProviderError::Status`].
async fn check_response(
    resp: reqwest::Response,
    url: &Url,
) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    tracing::debug!("HTTP {} for {}: {}", status.as_u16(), url, body);
    Err(ProviderError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
    })
}
