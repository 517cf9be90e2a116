//! Client crate for the marketplace's retailer API.
//!
//! [`MarketplaceApi`] wraps the authenticated REST surface (token cache, rate-limit retry, error-body surfacing).
//! [`ExportJobRunner`] drives the asynchronous bulk offer export from job request to a parsed
//! [`catalog::ParsedCatalog`]. Neither holds any run state; both are cheap to clone and safe to share.

mod api;
mod auth;
pub mod catalog;
mod config;
mod error;

pub mod data_objects;
mod export;

pub use api::MarketplaceApi;
pub use catalog::{CatalogOffer, ParsedCatalog};
pub use config::{MarketplaceConfig, RetryPolicy};
pub use error::MarketplaceApiError;
pub use export::ExportJobRunner;
