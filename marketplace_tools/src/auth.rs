use chrono::{DateTime, Duration, Utc};
use log::*;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{config::MarketplaceConfig, data_objects::TokenResponse, MarketplaceApiError};

/// Tokens are refreshed this long before their actual expiry, so that a token obtained just before a long request
/// cannot expire mid-flight.
const EXPIRY_MARGIN_SECS: i64 = 30;
/// Applied when the token endpoint does not report a lifetime.
const DEFAULT_TOKEN_TTL_SECS: i64 = 299;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Memoized bearer token for the client-credentials flow. The mutex is held across a refresh, so concurrent callers
/// never race two token requests.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bearer_token(
        &self,
        client: &Client,
        config: &MarketplaceConfig,
    ) -> Result<String, MarketplaceApiError> {
        let mut guard = self.cached.lock().await;
        if let Some(cached) = guard.as_ref() {
            if !cached.needs_refresh(Utc::now()) {
                return Ok(cached.token.clone());
            }
            debug!("🛒️ Access token is within {EXPIRY_MARGIN_SECS}s of expiry. Requesting a fresh one.");
        }
        let fresh = fetch_token(client, config).await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }
}

async fn fetch_token(client: &Client, config: &MarketplaceConfig) -> Result<CachedToken, MarketplaceApiError> {
    trace!("🛒️ Requesting access token from {}", config.token_url);
    let response = client
        .post(&config.token_url)
        .basic_auth(&config.client_id, Some(config.client_secret.reveal()))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| MarketplaceApiError::Auth(e.to_string()))?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(MarketplaceApiError::Auth(format!("Token endpoint returned status {status}. {body}")));
    }
    let token = response.json::<TokenResponse>().await.map_err(|e| MarketplaceApiError::Auth(e.to_string()))?;
    let ttl = token.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
    let expires_at = Utc::now() + Duration::seconds(ttl);
    debug!("🛒️ Obtained access token. Valid until {expires_at}");
    Ok(CachedToken { token: token.access_token, expires_at })
}
