use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssg_common::{Ean, FulfilmentChannel};

/// Minimum local quantity withheld from the marketplace when a product carries no per-EAN override.
pub const DEFAULT_SAFETY_STOCK: i64 = 10;
/// The platform caps published stock per offer; larger writes are rejected.
pub const PLATFORM_MAX_STOCK: i64 = 999;
/// How many per-item failures a run report retains. Counts are always complete; the sample is for observability.
pub const FAILURE_SAMPLE_CAP: usize = 20;
const DEFAULT_DISPATCH_DELAY_MS: u64 = 100;

//--------------------------------------    Snapshots    -------------------------------------------------------------

/// One offer from the marketplace catalog export, as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSnapshot {
    pub offer_id: String,
    pub ean: Ean,
    pub reference_code: Option<String>,
    /// Stock figure currently published on the marketplace.
    pub published_stock: i64,
    pub channel: FulfilmentChannel,
}

/// Platform-held stock for one EAN. Only the regular subtotal is sellable as new, so only it feeds decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformStock {
    pub regular: i64,
    pub graded: i64,
    pub non_conforming: i64,
}

/// ERP stock at the reference warehouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeStock {
    pub on_hand: i64,
    pub reserved: i64,
}

impl FreeStock {
    pub fn free(&self) -> i64 {
        self.on_hand - self.reserved
    }
}

//--------------------------------------    Decisions    -------------------------------------------------------------

/// What, if anything, to do for one offer. Produced by [`crate::reconcile`]; side-effect free.
///
/// The variants encode the channel-swap invariants: a swap to the merchant channel always carries the stock amount
/// to publish afterwards, and a swap to the platform channel never carries one (the platform owns that channel's
/// stock figure once swapped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    NoAction,
    SetStock { amount: i64 },
    SwapToMerchant { publish_stock: i64 },
    SwapToPlatform,
    Blocked { reason: String },
}

impl Decision {
    /// Whether this decision results in at least one API call.
    pub fn requires_dispatch(&self) -> bool {
        !matches!(self, Decision::NoAction | Decision::Blocked { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDecision {
    pub offer_id: String,
    pub ean: Ean,
    pub decision: Decision,
}

//--------------------------------------    Policy    ----------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SyncPolicy {
    pub default_safety_stock: i64,
    pub platform_max_stock: i64,
    /// Pause between consecutive dispatcher API calls, keeping the run under the platform's aggregate
    /// requests-per-second ceiling.
    pub dispatch_delay: Duration,
    pub failure_sample_cap: usize,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            default_safety_stock: DEFAULT_SAFETY_STOCK,
            platform_max_stock: PLATFORM_MAX_STOCK,
            dispatch_delay: Duration::from_millis(DEFAULT_DISPATCH_DELAY_MS),
            failure_sample_cap: FAILURE_SAMPLE_CAP,
        }
    }
}

//--------------------------------------    Run results    -----------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub checked: usize,
    pub swapped_to_merchant: usize,
    pub swapped_to_platform: usize,
    pub blocked_by_safety_stock: usize,
    pub updated: usize,
    pub failed: usize,
    /// Export rows that could not be read and were skipped by the parser.
    pub rows_skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOutcome {
    Blocked { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub offer_id: String,
    pub ean: Ean,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Failed,
    AlreadyRunning,
}

/// The outcome of one sync run. The orchestrator keeps the most recent one in memory for status queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRunResult {
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub error: Option<String>,
    pub counts: SyncCounts,
    /// Capped sample of blocked and failed items.
    pub item_sample: Vec<ItemResult>,
}

impl SyncRunResult {
    pub fn already_running() -> Self {
        let now = Utc::now();
        Self {
            status: RunStatus::AlreadyRunning,
            started_at: now,
            finished_at: now,
            error: None,
            counts: SyncCounts::default(),
            item_sample: vec![],
        }
    }

    pub fn failed(started_at: DateTime<Utc>, error: String) -> Self {
        Self {
            status: RunStatus::Failed,
            started_at,
            finished_at: Utc::now(),
            error: Some(error),
            counts: SyncCounts::default(),
            item_sample: vec![],
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

//--------------------------------------    Cancellation    ----------------------------------------------------------

/// Cooperative cancellation for an in-flight run. Checked between dispatcher items, so cancelling costs at most one
/// more API call.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
