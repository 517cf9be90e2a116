use std::collections::HashMap;

use ssg_common::Ean;
use thiserror::Error;

use crate::sync_objects::{OfferSnapshot, PlatformStock};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Authentication with the marketplace failed: {0}")]
    Auth(String),
    #[error("The marketplace rate limit budget was exhausted: {0}")]
    RateLimited(String),
    #[error("The offer export failed: {0}")]
    ExportFailed(String),
    #[error("The offer export did not complete in time: {0}")]
    ExportTimeout(String),
    #[error("The offer export could not be parsed: {0}")]
    Parse(String),
    #[error("Marketplace API error: {0}")]
    Api(String),
}

/// The marketplace's current catalog, one entry per offer, plus the number of export rows the parser had to skip.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub offers: Vec<OfferSnapshot>,
    pub skipped_rows: usize,
}

/// Read side of the marketplace: the offer catalog and the platform warehouse stock.
///
/// Both methods return complete snapshots. The orchestrator reads each exactly once per run, so all decisions in a
/// run are computed from one consistent view.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Platform-held stock for the full assortment, keyed by EAN.
    async fn platform_stock(&self) -> Result<HashMap<Ean, PlatformStock>, CatalogError>;

    /// The current offer catalog, obtained through the bulk export pipeline (request, poll, download, parse).
    async fn current_catalog(&self) -> Result<CatalogSnapshot, CatalogError>;
}
