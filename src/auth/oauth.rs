//! OAuth2 token endpoint flows: refresh-token renewal and client credentials

use std::sync::Arc;

use chrono::Utc;
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, ClientId, ClientSecret,
    RefreshToken, TokenResponse, TokenUrl,
};
use thiserror::Error;

use super::{
    expires_at_after, ClientCredentials, Credential, CredentialStore, Endpoints, PROVIDER,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid OAuth endpoint URL: {0}")]
    Endpoint(#[from] oauth2::url::ParseError),
    #[error("token request failed: {0}")]
    TokenRequest(String),
}

/// Build the OAuth2 client. Client authentication uses HTTP Basic.
pub fn build_client(
    credentials: &ClientCredentials,
    endpoints: &Endpoints,
) -> Result<BasicClient, AuthError> {
    Ok(BasicClient::new(
        ClientId::new(credentials.client_id.clone()),
        Some(ClientSecret::new(credentials.client_secret.clone())),
        AuthUrl::new(endpoints.authorize_url())?,
        Some(TokenUrl::new(endpoints.token_url())?),
    ))
}

/// Request an app-level token via the client-credentials grant.
/// Returns (access_token, expires_in_secs).
pub async fn fetch_app_token(client: &BasicClient) -> Result<(String, Option<u64>), AuthError> {
    tracing::debug!("Requesting client-credentials token");

    let token_response = client
        .exchange_client_credentials()
        .request_async(async_http_client)
        .await
        .map_err(|e| AuthError::TokenRequest(e.to_string()))?;

    Ok((
        token_response.access_token().secret().to_string(),
        token_response.expires_in().map(|d| d.as_secs()),
    ))
}

/// Exchange a refresh token for a new access token.
/// Returns (access_token, expires_in_secs, rotated_refresh_token).
async fn exchange_refresh_token(
    client: &BasicClient,
    refresh_token: &str,
) -> Result<(String, Option<u64>, Option<String>), AuthError> {
    let token_response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(async_http_client)
        .await
        .map_err(|e| AuthError::TokenRequest(e.to_string()))?;

    Ok((
        token_response.access_token().secret().to_string(),
        token_response.expires_in().map(|d| d.as_secs()),
        token_response.refresh_token().map(|rt| rt.secret().to_string()),
    ))
}

/// Keeps stored user credentials usable, renewing them when expired.
///
/// Renewals for the same user are not serialized. Two concurrent refreshes
/// both write back; whichever lands last is kept.
pub struct TokenRefresher {
    store: Arc<dyn CredentialStore>,
    client: BasicClient,
}

impl TokenRefresher {
    pub fn new(store: Arc<dyn CredentialStore>, client: BasicClient) -> Self {
        Self { store, client }
    }

    /// A usable access token for `user_id`, or `None` if the user has no
    /// linked account or the stored credential cannot be renewed.
    pub async fn ensure_valid_access_token(&self, user_id: &str) -> Option<String> {
        self.ensure_valid_access_token_at(user_id, Utc::now().timestamp_millis())
            .await
    }

    /// Same as [`Self::ensure_valid_access_token`] with an explicit clock (epoch millis).
    pub async fn ensure_valid_access_token_at(&self, user_id: &str, now_ms: i64) -> Option<String> {
        let credential = match self.store.get_credential(user_id, PROVIDER) {
            Ok(Some(c)) => c,
            Ok(None) => {
                tracing::debug!("No {} credential for user {}", PROVIDER, user_id);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read credential for {}: {}", user_id, e);
                return None;
            }
        };

        if credential.access_token.is_empty() {
            tracing::debug!("Stored credential for {} has no access token", user_id);
            return None;
        }

        if !credential.is_expired_at(now_ms) {
            return Some(credential.access_token);
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            tracing::info!(
                "Access token for {} expired and no refresh token stored; re-authentication needed",
                user_id
            );
            return None;
        };

        tracing::info!("Access token for {} expired, refreshing...", user_id);

        let (access_token, expires_in, rotated) =
            match exchange_refresh_token(&self.client, &refresh_token).await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("Token refresh failed for {}: {}", user_id, e);
                    return None;
                }
            };

        let renewed = Credential {
            access_token: access_token.clone(),
            expires_at: expires_in
                .map(|secs| expires_at_after(now_ms.div_euclid(1000), secs)),
            // Keep the old refresh token unless the provider rotated it
            refresh_token: rotated.or(Some(refresh_token)),
            ..credential
        };

        if let Err(e) = self.store.put_credential(renewed) {
            tracing::warn!("Failed to persist refreshed token for {}: {}", user_id, e);
            return None;
        }

        tracing::info!("Token refreshed for {}", user_id);
        Some(access_token)
    }
}
