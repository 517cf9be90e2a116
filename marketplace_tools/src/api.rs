use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, RETRY_AFTER},
    Client,
    Method,
    Response,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use ssg_common::FulfilmentChannel;

use crate::{
    auth::TokenCache,
    config::{MarketplaceConfig, RetryPolicy},
    data_objects::{ExportJob, FulfilmentUpdate, InventoryEntry, InventoryPage, StockUpdate},
    MarketplaceApiError,
};

/// Page size of the inventory listing. A page with fewer entries than this signals end-of-data.
pub const INVENTORY_PAGE_SIZE: usize = 50;

/// Authenticated, rate-limit-aware wrapper around the retailer API.
///
/// Each call is independent; the client retries 429 responses within its [`RetryPolicy`] budget but does no
/// queueing. Pacing between consecutive calls is the caller's responsibility.
#[derive(Clone)]
pub struct MarketplaceApi {
    config: MarketplaceConfig,
    client: Arc<Client>,
    tokens: Arc<TokenCache>,
}

impl MarketplaceApi {
    pub fn new(config: MarketplaceConfig) -> Result<Self, MarketplaceApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MarketplaceApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), tokens: Arc::new(TokenCache::new()) })
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Sends an authenticated request and returns the deserialized body, or `None` for a bodyless success
    /// (202/204). 429 responses are retried after the server-specified delay within the retry budget; any other
    /// non-2xx surfaces as [`MarketplaceApiError::Api`] carrying the error body's human-readable detail.
    pub async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<Option<T>, MarketplaceApiError> {
        let response = self.send_raw(method, path, body).await?;
        if matches!(response.status(), StatusCode::ACCEPTED | StatusCode::NO_CONTENT) {
            return Ok(None);
        }
        response.json::<T>().await.map(Some).map_err(|e| MarketplaceApiError::Json(e.to_string()))
    }

    async fn send_raw<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<Response, MarketplaceApiError> {
        let token = self.tokens.bearer_token(&self.client, &self.config).await?;
        let url = self.url(path);
        let retry = self.config.retry;
        let mut attempts = 0u32;
        // Bounded retry loop. Only 429 re-enters it; every other status returns on the first pass.
        loop {
            attempts += 1;
            trace!("🛒️ {method} {url} (attempt {attempts})");
            let mut req = self.client.request(method.clone(), url.as_str()).bearer_auth(&token);
            if let Some(body) = &body {
                req = req.json(body);
            }
            let response = req.send().await.map_err(|e| MarketplaceApiError::Http(e.to_string()))?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts >= retry.max_attempts {
                    warn!("🛒️ {method} {url} still rate limited after {attempts} attempts. Giving up.");
                    return Err(MarketplaceApiError::RateLimited { attempts });
                }
                let delay = retry_after_delay(&response, &retry);
                debug!("🛒️ {method} {url} was rate limited. Retrying in {}s.", delay.as_secs());
                tokio::time::sleep(delay).await;
                continue;
            }
            if status.is_success() {
                trace!("🛒️ {method} {url} succeeded with status {status}");
                return Ok(response);
            }
            let detail = error_detail(response).await;
            return Err(MarketplaceApiError::Api { status: status.as_u16(), detail });
        }
    }

    /// Requests a new bulk offer export. The export job runs asynchronously on the marketplace side.
    pub async fn request_export(&self) -> Result<ExportJob, MarketplaceApiError> {
        #[derive(Serialize)]
        struct ExportRequest {
            format: &'static str,
        }
        debug!("📦️ Requesting offer export");
        let job = self
            .send::<ExportJob, ExportRequest>(Method::POST, "/offers/export", Some(ExportRequest { format: "CSV" }))
            .await?
            .ok_or(MarketplaceApiError::EmptyResponse)?;
        info!("📦️ Offer export job {} created", job.job_id);
        Ok(job)
    }

    pub async fn export_status(&self, job_id: &str) -> Result<ExportJob, MarketplaceApiError> {
        let path = format!("/jobs/{job_id}");
        let job = self
            .send::<ExportJob, ()>(Method::GET, &path, None)
            .await?
            .ok_or(MarketplaceApiError::EmptyResponse)?;
        trace!("📦️ Job {job_id} status: {:?}", job.status);
        Ok(job)
    }

    /// Downloads the raw CSV payload of a completed export.
    pub async fn download_export(&self, report_id: &str) -> Result<String, MarketplaceApiError> {
        let path = format!("/offers/export/{report_id}");
        debug!("📦️ Downloading export report {report_id}");
        let response = self.send_raw::<()>(Method::GET, &path, None).await?;
        response.text().await.map_err(|e| MarketplaceApiError::Http(e.to_string()))
    }

    pub async fn platform_stock_page(&self, page: u32) -> Result<Vec<InventoryEntry>, MarketplaceApiError> {
        let path = format!("/inventory?page={page}");
        let result = self
            .send::<InventoryPage, ()>(Method::GET, &path, None)
            .await?
            .unwrap_or_default();
        Ok(result.inventory)
    }

    /// Fetches the complete platform warehouse inventory. Pages are read until a short page signals end-of-data.
    pub async fn fetch_platform_stock(&self) -> Result<Vec<InventoryEntry>, MarketplaceApiError> {
        let mut entries = vec![];
        let mut page = 1u32;
        loop {
            let batch = self.platform_stock_page(page).await?;
            let batch_len = batch.len();
            entries.extend(batch);
            if batch_len < INVENTORY_PAGE_SIZE {
                break;
            }
            page += 1;
        }
        debug!("🛒️ Fetched platform stock for {} EANs over {page} page(s)", entries.len());
        Ok(entries)
    }

    pub async fn update_stock(
        &self,
        offer_id: &str,
        amount: i64,
        managed_by_merchant: bool,
    ) -> Result<(), MarketplaceApiError> {
        let path = format!("/offers/{offer_id}/stock");
        let body = StockUpdate { amount, managed_by_merchant };
        self.send::<serde_json::Value, StockUpdate>(Method::PUT, &path, Some(body)).await?;
        info!("🛒️ Updated stock for offer {offer_id} to {amount}");
        Ok(())
    }

    pub async fn update_fulfilment(
        &self,
        offer_id: &str,
        channel: FulfilmentChannel,
    ) -> Result<(), MarketplaceApiError> {
        let path = format!("/offers/{offer_id}/fulfilment");
        let delivery_code = match channel {
            FulfilmentChannel::Merchant => Some(self.config.delivery_code.clone()),
            FulfilmentChannel::Platform => None,
        };
        let body = FulfilmentUpdate { method: channel.wire_token().to_string(), delivery_code };
        self.send::<serde_json::Value, FulfilmentUpdate>(Method::PUT, &path, Some(body)).await?;
        info!("🛒️ Moved offer {offer_id} to the {channel} channel");
        Ok(())
    }
}

fn retry_after_delay(response: &Response, policy: &RetryPolicy) -> std::time::Duration {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(std::time::Duration::from_secs)
        .unwrap_or(policy.default_delay)
}

/// Pulls a human-readable message out of an error body. The API nests it under `detail` (or `title` in older
/// revisions); anything unparseable is surfaced verbatim.
async fn error_detail(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| {
            v.get("detail")
                .and_then(serde_json::Value::as_str)
                .or_else(|| v.get("title").and_then(serde_json::Value::as_str))
                .map(str::to_string)
        })
        .unwrap_or(text)
}
