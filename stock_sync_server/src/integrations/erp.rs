//! Batched inventory lookups against the ERP's JSON-RPC endpoint.
//!
//! The ERP exposes two calls for this pipeline: free quantities (on hand / reserved) at the reference warehouse,
//! and per-product safety-stock overrides. Both accept the full EAN list of a run in one request.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use log::*;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use ssg_common::Ean;
use stock_sync_engine::{
    traits::{InventoryError, LocalInventory},
    FreeStock,
};

use crate::{config::ErpConfig, errors::ServerError};

#[derive(Serialize)]
struct RpcRequest<P: Serialize> {
    jsonrpc: &'static str,
    method: &'static str,
    id: u64,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Serialize)]
struct InventoryParams<'a> {
    service: &'static str,
    method: &'static str,
    database: &'a str,
    username: &'a str,
    api_key: &'a str,
    warehouse: &'a str,
    eans: &'a [Ean],
}

pub struct ErpInventory {
    config: ErpConfig,
    client: Client,
    next_id: AtomicU64,
}

impl ErpInventory {
    pub fn new(config: ErpConfig) -> Result<Self, ServerError> {
        let client = Client::builder().build().map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { config, client, next_id: AtomicU64::new(1) })
    }

    async fn call<T: DeserializeOwned + Default>(&self, method: &'static str, eans: &[Ean]) -> Result<T, InventoryError> {
        let params = InventoryParams {
            service: "stock",
            method,
            database: &self.config.database,
            username: &self.config.username,
            api_key: self.config.api_key.reveal(),
            warehouse: &self.config.warehouse,
            eans,
        };
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            params,
        };
        trace!("🗄️ ERP call stock.{method} for {} EAN(s)", eans.len());
        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| InventoryError::Backend(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(InventoryError::Backend(format!("ERP endpoint returned status {status}")));
        }
        let body = response.json::<RpcResponse<T>>().await.map_err(|e| InventoryError::Backend(e.to_string()))?;
        if let Some(error) = body.error {
            return Err(InventoryError::Backend(error.message));
        }
        body.result.ok_or_else(|| InventoryError::Backend("ERP response carried neither result nor error".to_string()))
    }
}

impl LocalInventory for ErpInventory {
    async fn free_stock(&self, eans: &[Ean]) -> Result<HashMap<Ean, FreeStock>, InventoryError> {
        #[derive(Deserialize)]
        struct Quantities {
            #[serde(rename = "onHand")]
            on_hand: i64,
            #[serde(default)]
            reserved: i64,
        }
        let result: HashMap<Ean, Quantities> = self.call("free_quantities", eans).await?;
        debug!("🗄️ ERP returned free stock for {} of {} EAN(s)", result.len(), eans.len());
        Ok(result
            .into_iter()
            .map(|(ean, q)| (ean, FreeStock { on_hand: q.on_hand, reserved: q.reserved }))
            .collect())
    }

    async fn safety_stock_overrides(&self, eans: &[Ean]) -> Result<HashMap<Ean, i64>, InventoryError> {
        let overrides: HashMap<Ean, i64> = self.call("safety_overrides", eans).await?;
        debug!("🗄️ ERP returned {} safety stock override(s)", overrides.len());
        Ok(overrides)
    }
}
