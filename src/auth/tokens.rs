//! Credential records, the credential store seam, and the app token cache

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Per-user provider credential, one per (user_id, provider).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: String,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry in epoch seconds. `None` means the provider gave no lifetime.
    pub expires_at: Option<i64>,
}

/// Epoch seconds `expires_in` seconds after `now_secs`, saturating.
pub fn expires_at_after(now_secs: i64, expires_in: u64) -> i64 {
    now_secs.saturating_add(i64::try_from(expires_in).unwrap_or(i64::MAX))
}

impl Credential {
    /// Whether the access token has expired as of `now_ms` (epoch millis).
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expires_at {
            Some(exp) => exp.saturating_mul(1000) < now_ms,
            None => false,
        }
    }
}

/// Storage backend for per-user credentials.
pub trait CredentialStore: Send + Sync {
    fn get_credential(&self, user_id: &str, provider: &str)
        -> Result<Option<Credential>, StoreError>;
    fn put_credential(&self, credential: Credential) -> Result<(), StoreError>;
    fn remove_credential(&self, user_id: &str, provider: &str) -> Result<bool, StoreError>;
}

/// Client-credentials token shared by every request without a user credential.
#[derive(Debug, Clone, PartialEq)]
pub struct AppToken {
    pub token: String,
    /// Epoch millis after which the token must not be served.
    pub expires_at_ms: i64,
}

/// Seconds shaved off the provider's lifetime to tolerate clock skew.
pub const APP_TOKEN_SKEW_SECS: i64 = 60;

impl AppToken {
    pub fn new(token: String, expires_in_secs: u64, now_ms: i64) -> Self {
        let lifetime_ms = i64::try_from(expires_in_secs)
            .unwrap_or(i64::MAX)
            .saturating_sub(APP_TOKEN_SKEW_SECS)
            .saturating_mul(1000);
        Self {
            token,
            expires_at_ms: now_ms.saturating_add(lifetime_ms),
        }
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Process-scoped holder for the app token.
///
/// Starts empty and is filled lazily. Concurrent callers may each observe an
/// expired entry and fetch a fresh token; the last write wins.
#[derive(Debug, Default)]
pub struct AppTokenCache {
    inner: RwLock<Option<AppToken>>,
}

impl AppTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token, if one is present and still valid at `now_ms`.
    pub fn get(&self, now_ms: i64) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|t| t.is_valid_at(now_ms))
            .map(|t| t.token.clone())
    }

    pub fn set(&self, token: AppToken) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token);
    }
}
