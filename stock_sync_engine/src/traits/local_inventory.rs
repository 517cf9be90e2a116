use std::collections::HashMap;

use ssg_common::Ean;
use thiserror::Error;

use crate::sync_objects::FreeStock;

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("ERP inventory call failed: {0}")]
    Backend(String),
}

/// The ERP side of the pipeline: batched stock lookups against the single reference warehouse.
///
/// Implementations receive exactly the EAN set referenced by the current export, never the full product catalog.
#[allow(async_fn_in_trait)]
pub trait LocalInventory {
    /// On-hand and reserved quantities for the given EANs. EANs unknown to the ERP are absent from the result.
    async fn free_stock(&self, eans: &[Ean]) -> Result<HashMap<Ean, FreeStock>, InventoryError>;

    /// Per-EAN safety stock overrides. EANs without an override are absent; the caller applies the process-wide
    /// default.
    async fn safety_stock_overrides(&self, eans: &[Ean]) -> Result<HashMap<Ean, i64>, InventoryError>;
}
