//! # Stock sync gateway server
//!
//! Hosts the catalog reconciliation pipeline behind a small HTTP surface:
//! * `/health`: liveness probe.
//! * `/api/sync/run`: trigger a sync run (no-op while one is in flight).
//! * `/api/sync/status`: counts and error sample of the most recent run.
//! * `/api/sync/cancel`: abort the in-flight run between dispatch items.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! An optional interval worker triggers runs on a timer; external schedulers can use the run endpoint instead.

pub mod config;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod sync_worker;
