//! Authentication module for the catalog provider
//!
//! Keeps per-user OAuth credentials fresh via the refresh-token grant and
//! obtains app-level tokens via the client-credentials grant.

pub mod oauth;
pub mod tokens;

pub use oauth::{fetch_app_token, AuthError, TokenRefresher};
pub use tokens::{expires_at_after, AppToken, AppTokenCache, Credential, CredentialStore};

/// Provider name credentials are stored under
pub const PROVIDER: &str = "spotify";

/// OAuth client registration used for Basic client authentication
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Provider endpoint base URLs
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Accounts service base, e.g. `https://accounts.spotify.com`
    pub accounts_url: String,
    /// Catalog API base, e.g. `https://api.spotify.com/v1`
    pub api_url: String,
}

impl Endpoints {
    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_url.trim_end_matches('/'))
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_url.trim_end_matches('/'))
    }
}

impl From<&crate::config::Config> for Endpoints {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            accounts_url: config.accounts_url.clone(),
            api_url: config.api_url.clone(),
        }
    }
}
