use std::{env, time::Duration};

use log::*;
use marketplace_tools::MarketplaceConfig;
use ssg_common::{
    helpers::{env_or, parse_boolean_flag},
    Secret,
};
use stock_sync_engine::{sync_objects, SyncPolicy};

const DEFAULT_SSG_HOST: &str = "127.0.0.1";
const DEFAULT_SSG_PORT: u16 = 8460;
const DEFAULT_ERP_WAREHOUSE: &str = "WH-MAIN";
const DEFAULT_DISPATCH_DELAY_MS: u64 = 100;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Interval between automatic sync runs. Zero disables the worker; runs can always be triggered via the API.
    pub sync_interval: Duration,
    /// Whether the worker fires immediately at startup, or only after the first full interval.
    pub sync_on_startup: bool,
    pub marketplace: MarketplaceConfig,
    pub erp: ErpConfig,
    pub policy: SyncPolicy,
}

/// Connection details of the ERP's JSON-RPC inventory endpoint.
#[derive(Clone, Debug, Default)]
pub struct ErpConfig {
    pub url: String,
    pub database: String,
    pub username: String,
    pub api_key: Secret<String>,
    /// The single reference warehouse whose free stock is published to the marketplace.
    pub warehouse: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SSG_HOST.to_string(),
            port: DEFAULT_SSG_PORT,
            sync_interval: Duration::ZERO,
            sync_on_startup: true,
            marketplace: MarketplaceConfig::default(),
            erp: ErpConfig::default(),
            policy: SyncPolicy::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("SSG_HOST").ok().unwrap_or_else(|| DEFAULT_SSG_HOST.into());
        let port = env::var("SSG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SSG_PORT. {e} Using the default, {DEFAULT_SSG_PORT}, instead."
                    );
                    DEFAULT_SSG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SSG_PORT);
        let sync_interval = Duration::from_secs(env_or("SSG_SYNC_INTERVAL_SECS", 0u64));
        if sync_interval.is_zero() {
            info!("🪛️ SSG_SYNC_INTERVAL_SECS is not set. Runs must be triggered via the API or the CLI.");
        }
        let sync_on_startup = parse_boolean_flag(env::var("SSG_SYNC_ON_STARTUP").ok(), true);
        let marketplace = MarketplaceConfig::new_from_env_or_default();
        let erp = ErpConfig::from_env_or_default();
        let policy = configure_policy();
        Self { host, port, sync_interval, sync_on_startup, marketplace, erp, policy }
    }
}

impl ErpConfig {
    pub fn from_env_or_default() -> Self {
        let url = env::var("SSG_ERP_URL").unwrap_or_else(|_| {
            error!("🪛️ SSG_ERP_URL is not set. Please set it to the ERP's JSON-RPC endpoint.");
            String::default()
        });
        let database = env::var("SSG_ERP_DATABASE").unwrap_or_else(|_| {
            error!("🪛️ SSG_ERP_DATABASE is not set. Please set it to the ERP database name.");
            String::default()
        });
        let username = env::var("SSG_ERP_USERNAME").unwrap_or_else(|_| {
            error!("🪛️ SSG_ERP_USERNAME is not set. Please set it to the ERP API user.");
            String::default()
        });
        let api_key = Secret::new(env::var("SSG_ERP_API_KEY").unwrap_or_else(|_| {
            error!("🪛️ SSG_ERP_API_KEY is not set. ERP requests will be rejected.");
            String::default()
        }));
        let warehouse = env::var("SSG_ERP_WAREHOUSE").unwrap_or_else(|_| {
            warn!("🪛️ SSG_ERP_WAREHOUSE not set, using {DEFAULT_ERP_WAREHOUSE} as default");
            DEFAULT_ERP_WAREHOUSE.to_string()
        });
        Self { url, database, username, api_key, warehouse }
    }
}

fn configure_policy() -> SyncPolicy {
    let default_safety_stock = env_or("SSG_DEFAULT_SAFETY_STOCK", sync_objects::DEFAULT_SAFETY_STOCK);
    let dispatch_delay = Duration::from_millis(env_or("SSG_DISPATCH_DELAY_MS", DEFAULT_DISPATCH_DELAY_MS));
    let failure_sample_cap = env_or("SSG_FAILURE_SAMPLE_CAP", sync_objects::FAILURE_SAMPLE_CAP);
    SyncPolicy { default_safety_stock, platform_max_stock: sync_objects::PLATFORM_MAX_STOCK, dispatch_delay, failure_sample_cap }
}
