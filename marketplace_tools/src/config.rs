use std::{env, time::Duration};

use log::*;
use ssg_common::{helpers::env_or, Secret};

const DEFAULT_BASE_URL: &str = "https://api.marketplace.example/retailer";
const DEFAULT_TOKEN_URL: &str = "https://login.marketplace.example/token";
const DEFAULT_DELIVERY_CODE: &str = "STANDARD-24H";
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_MAX_POLL_WAIT_MS: u64 = 120_000;
const DEFAULT_MAX_RATE_LIMIT_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: u64 = 2;

/// Bounded-retry behaviour for rate-limited calls. The delay is only used when the server does not supply a
/// `Retry-After` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub default_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RATE_LIMIT_ATTEMPTS,
            default_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MarketplaceConfig {
    /// Base url of the retailer API, e.g. `https://api.marketplace.example/retailer`.
    pub base_url: String,
    /// The OAuth2 client-credentials token endpoint.
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// Delivery-speed code sent with fulfilment updates to the merchant channel. The platform rejects a
    /// merchant-channel update without one.
    pub delivery_code: String,
    pub retry: RetryPolicy,
    /// Time between two reads of an export job's status.
    pub poll_interval: Duration,
    /// Wall-clock budget for the export poll loop. Exceeding it aborts the sync run.
    pub max_poll_wait: Duration,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: String::default(),
            client_secret: Secret::default(),
            delivery_code: DEFAULT_DELIVERY_CODE.to_string(),
            retry: RetryPolicy::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_poll_wait: Duration::from_millis(DEFAULT_MAX_POLL_WAIT_MS),
        }
    }
}

impl MarketplaceConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = env::var("SSG_MP_BASE_URL").unwrap_or_else(|_| {
            warn!("🪛️ SSG_MP_BASE_URL not set, using {DEFAULT_BASE_URL} as default");
            DEFAULT_BASE_URL.to_string()
        });
        let token_url = env::var("SSG_MP_TOKEN_URL").unwrap_or_else(|_| {
            warn!("🪛️ SSG_MP_TOKEN_URL not set, using {DEFAULT_TOKEN_URL} as default");
            DEFAULT_TOKEN_URL.to_string()
        });
        let client_id = env::var("SSG_MP_CLIENT_ID").unwrap_or_else(|_| {
            error!("🪛️ SSG_MP_CLIENT_ID is not set. Requests against the marketplace API will not authenticate.");
            String::default()
        });
        let client_secret = Secret::new(env::var("SSG_MP_CLIENT_SECRET").unwrap_or_else(|_| {
            error!("🪛️ SSG_MP_CLIENT_SECRET is not set. Requests against the marketplace API will not authenticate.");
            String::default()
        }));
        let delivery_code = env::var("SSG_MP_DELIVERY_CODE").unwrap_or_else(|_| {
            warn!("🪛️ SSG_MP_DELIVERY_CODE not set, using {DEFAULT_DELIVERY_CODE} as default");
            DEFAULT_DELIVERY_CODE.to_string()
        });
        let retry = RetryPolicy {
            max_attempts: env_or("SSG_MP_MAX_RATE_LIMIT_ATTEMPTS", DEFAULT_MAX_RATE_LIMIT_ATTEMPTS),
            default_delay: Duration::from_secs(env_or("SSG_MP_RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_SECS)),
        };
        let poll_interval = Duration::from_millis(env_or("SSG_MP_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS));
        let max_poll_wait = Duration::from_millis(env_or("SSG_MP_MAX_POLL_WAIT_MS", DEFAULT_MAX_POLL_WAIT_MS));
        Self { base_url, token_url, client_id, client_secret, delivery_code, retry, poll_interval, max_poll_wait }
    }
}
