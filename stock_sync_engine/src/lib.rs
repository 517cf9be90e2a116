//! Stock Sync Engine
//!
//! The reconciliation core of the stock sync gateway. It is transport-agnostic: the marketplace and the ERP are
//! reached exclusively through the traits in [`mod@traits`], so the whole pipeline can be exercised without a
//! network in sight.
//!
//! The crate is divided into:
//! 1. The decision function ([`reconcile`]). It is pure, deterministic, and exhaustively unit-tested: given one
//!    consistent snapshot of the catalog and both stock sides, it computes a [`Decision`] per offer.
//! 2. The execution machinery. [`UpdateDispatcher`] applies decisions sequentially under the platform's global
//!    rate budget, and [`SyncOrchestrator`] owns the single-flight run lifecycle and the last run's result.

mod dispatcher;
mod orchestrator;
mod reconciler;
pub mod sync_objects;
pub mod traits;

pub use dispatcher::{DispatchReport, UpdateDispatcher};
pub use orchestrator::{SyncOrchestrator, SyncRunError};
pub use reconciler::reconcile;
pub use sync_objects::{
    CancelHandle,
    Decision,
    FreeStock,
    ItemOutcome,
    ItemResult,
    OfferDecision,
    OfferSnapshot,
    PlatformStock,
    RunStatus,
    SyncCounts,
    SyncPolicy,
    SyncRunResult,
};
