//! Concrete bindings of the engine's collaborator traits to the outside world: the marketplace client crate on one
//! side, the ERP's JSON-RPC inventory endpoint on the other.

pub mod erp;
pub mod marketplace;

pub use erp::ErpInventory;
pub use marketplace::{MarketplaceCatalog, MarketplaceUpdates};
