//! Adapters binding [`MarketplaceApi`] to the engine's [`CatalogSource`] and [`OfferUpdates`] seams.
//!
//! These are newtypes rather than direct trait impls because the traits and the client type live in different
//! crates. They also own the error translation: the client's error enum collapses into the engine's coarser
//! taxonomy exactly here.

use std::collections::HashMap;

use marketplace_tools::{CatalogOffer, ExportJobRunner, MarketplaceApi, MarketplaceApiError};
use ssg_common::{Ean, FulfilmentChannel};
use stock_sync_engine::{
    traits::{CatalogError, CatalogSnapshot, CatalogSource, OfferUpdates, UpdateError},
    OfferSnapshot,
    PlatformStock,
};

#[derive(Clone)]
pub struct MarketplaceCatalog {
    api: MarketplaceApi,
}

impl MarketplaceCatalog {
    pub fn new(api: MarketplaceApi) -> Self {
        Self { api }
    }
}

impl CatalogSource for MarketplaceCatalog {
    async fn platform_stock(&self) -> Result<HashMap<Ean, PlatformStock>, CatalogError> {
        let entries = self.api.fetch_platform_stock().await.map_err(catalog_error)?;
        Ok(entries
            .into_iter()
            .map(|e| {
                (e.ean, PlatformStock {
                    regular: e.regular_stock,
                    graded: e.graded_stock,
                    non_conforming: e.non_conforming_stock,
                })
            })
            .collect())
    }

    async fn current_catalog(&self) -> Result<CatalogSnapshot, CatalogError> {
        let parsed = ExportJobRunner::new(self.api.clone()).run().await.map_err(catalog_error)?;
        let offers = parsed.offers.into_iter().map(offer_snapshot).collect();
        Ok(CatalogSnapshot { offers, skipped_rows: parsed.skipped_rows })
    }
}

#[derive(Clone)]
pub struct MarketplaceUpdates {
    api: MarketplaceApi,
}

impl MarketplaceUpdates {
    pub fn new(api: MarketplaceApi) -> Self {
        Self { api }
    }
}

impl OfferUpdates for MarketplaceUpdates {
    async fn set_stock(&self, offer_id: &str, amount: i64) -> Result<(), UpdateError> {
        // Stock writes only ever target merchant-managed offers
        self.api.update_stock(offer_id, amount, true).await.map_err(update_error)
    }

    async fn set_channel(&self, offer_id: &str, channel: FulfilmentChannel) -> Result<(), UpdateError> {
        self.api.update_fulfilment(offer_id, channel).await.map_err(update_error)
    }
}

fn offer_snapshot(offer: CatalogOffer) -> OfferSnapshot {
    OfferSnapshot {
        offer_id: offer.offer_id,
        ean: offer.ean,
        reference_code: offer.reference_code,
        published_stock: offer.published_stock,
        channel: offer.channel,
    }
}

fn catalog_error(e: MarketplaceApiError) -> CatalogError {
    match e {
        MarketplaceApiError::Auth(m) => CatalogError::Auth(m),
        MarketplaceApiError::RateLimited { .. } => CatalogError::RateLimited(e.to_string()),
        MarketplaceApiError::ExportFailed(m) => CatalogError::ExportFailed(m),
        MarketplaceApiError::ExportTimeout { .. } => CatalogError::ExportTimeout(e.to_string()),
        MarketplaceApiError::MissingRequiredColumns(_) | MarketplaceApiError::MissingResultHandle => {
            CatalogError::Parse(e.to_string())
        },
        other => CatalogError::Api(other.to_string()),
    }
}

fn update_error(e: MarketplaceApiError) -> UpdateError {
    match e {
        MarketplaceApiError::RateLimited { .. } => UpdateError::RateLimited(e.to_string()),
        other => UpdateError::Api(other.to_string()),
    }
}
