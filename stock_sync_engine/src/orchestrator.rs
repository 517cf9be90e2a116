use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
};

use chrono::Utc;
use log::*;
use ssg_common::Ean;
use thiserror::Error;

use crate::{
    dispatcher::UpdateDispatcher,
    reconciler::reconcile,
    sync_objects::{CancelHandle, Decision, ItemOutcome, ItemResult, RunStatus, SyncCounts, SyncPolicy, SyncRunResult},
    traits::{CatalogError, CatalogSource, InventoryError, LocalInventory, OfferUpdates},
};

/// Errors that abort a run before any update is dispatched.
#[derive(Debug, Clone, Error)]
pub enum SyncRunError {
    #[error("Marketplace catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("ERP inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Owns the run lifecycle: the single-flight guard, the cancellation handle and the last run's result.
///
/// One orchestrator instance exists per process, shared behind an `Arc`. The running flag is process-local; see
/// DESIGN.md for the multi-instance caveat.
pub struct SyncOrchestrator<C, U, I> {
    catalog: C,
    updates: U,
    inventory: I,
    policy: SyncPolicy,
    running: AtomicBool,
    cancel: CancelHandle,
    last_result: RwLock<Option<SyncRunResult>>,
}

/// Clears the running flag on every exit path, including panics inside a run.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<C, U, I> SyncOrchestrator<C, U, I>
where
    C: CatalogSource,
    U: OfferUpdates,
    I: LocalInventory,
{
    pub fn new(catalog: C, updates: U, inventory: I, policy: SyncPolicy) -> Self {
        Self {
            catalog,
            updates,
            inventory,
            policy,
            running: AtomicBool::new(false),
            cancel: CancelHandle::new(),
            last_result: RwLock::new(None),
        }
    }

    /// Handle for aborting the in-flight run between dispatcher items. Cancelling when no run is active is a no-op;
    /// the flag is rearmed at the start of each run.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// The most recent completed or failed run, if any. `AlreadyRunning` results are never stored.
    pub fn last_result(&self) -> Option<SyncRunResult> {
        self.last_result.read().expect("last_result lock poisoned").clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Executes one full sync run. A call while another run is in flight returns immediately with an
    /// [`RunStatus::AlreadyRunning`] result; runs are never queued.
    pub async fn run(&self) -> SyncRunResult {
        if self.running.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            info!("🔄️ A sync run is already in flight. Ignoring this trigger.");
            return SyncRunResult::already_running();
        }
        let _guard = RunningGuard(&self.running);
        self.cancel.reset();
        let started_at = Utc::now();
        info!("🔄️ Starting catalog sync run");
        let result = match self.execute().await {
            Ok((counts, item_sample)) => {
                let result = SyncRunResult {
                    status: RunStatus::Completed,
                    started_at,
                    finished_at: Utc::now(),
                    error: None,
                    counts,
                    item_sample,
                };
                info!(
                    "🔄️ Sync run completed in {}ms. {} checked, {} updated, {} → merchant, {} → platform, {} \
                     blocked, {} failed",
                    result.duration().num_milliseconds(),
                    counts.checked,
                    counts.updated,
                    counts.swapped_to_merchant,
                    counts.swapped_to_platform,
                    counts.blocked_by_safety_stock,
                    counts.failed
                );
                result
            },
            Err(e) => {
                error!("🔄️ Sync run aborted: {e}");
                SyncRunResult::failed(started_at, e.to_string())
            },
        };
        *self.last_result.write().expect("last_result lock poisoned") = Some(result.clone());
        result
    }

    async fn execute(&self) -> Result<(SyncCounts, Vec<ItemResult>), SyncRunError> {
        // One consistent snapshot per run: both stock sides are read exactly once, before any decision.
        let platform_stock = self.catalog.platform_stock().await?;
        let catalog = self.catalog.current_catalog().await?;
        debug!(
            "🔄️ Snapshot ready: {} offers in catalog, {} EANs in platform stock",
            catalog.offers.len(),
            platform_stock.len()
        );
        // Batch the ERP lookups to exactly the EAN set the export references
        let eans: Vec<Ean> = catalog.offers.iter().map(|o| o.ean.clone()).collect::<BTreeSet<_>>().into_iter().collect();
        let local_stock = self.inventory.free_stock(&eans).await?;
        let safety_overrides = self.inventory.safety_stock_overrides(&eans).await?;
        let decisions = reconcile(&catalog.offers, &platform_stock, &local_stock, &safety_overrides, &self.policy);

        let mut item_sample: Vec<ItemResult> = vec![];
        let mut blocked_by_safety_stock = 0usize;
        for item in &decisions {
            if let Decision::Blocked { reason } = &item.decision {
                blocked_by_safety_stock += 1;
                if item_sample.len() < self.policy.failure_sample_cap {
                    item_sample.push(ItemResult {
                        offer_id: item.offer_id.clone(),
                        ean: item.ean.clone(),
                        outcome: ItemOutcome::Blocked { reason: reason.clone() },
                    });
                }
            }
        }

        let dispatcher = UpdateDispatcher::new(&self.updates, &self.policy);
        let report = dispatcher.dispatch(&decisions, &self.cancel).await;
        if report.aborted {
            warn!("🔄️ Run was cancelled mid-dispatch. Counts cover the applied prefix only.");
        }
        item_sample.extend(report.failures);

        let counts = SyncCounts {
            checked: catalog.offers.len(),
            swapped_to_merchant: report.swapped_to_merchant,
            swapped_to_platform: report.swapped_to_platform,
            blocked_by_safety_stock,
            updated: report.updated,
            failed: report.failed,
            rows_skipped: catalog.skipped_rows,
        };
        Ok((counts, item_sample))
    }
}
