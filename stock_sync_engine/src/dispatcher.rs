//! Sequential execution of reconciliation decisions.
//!
//! The platform's rate limit is one global budget for the whole run, so items are applied one at a time with a
//! fixed pause between API calls. One item's failure is recorded and the run moves on; nothing an individual offer
//! does can abort dispatching.

use log::*;
use ssg_common::FulfilmentChannel;

use crate::{
    sync_objects::{CancelHandle, Decision, ItemOutcome, ItemResult, OfferDecision, SyncPolicy},
    traits::{OfferUpdates, UpdateError},
};

#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub updated: usize,
    pub swapped_to_merchant: usize,
    pub swapped_to_platform: usize,
    pub failed: usize,
    /// Capped sample of failed items; `failed` is the complete count.
    pub failures: Vec<ItemResult>,
    /// True when a cancellation stopped dispatching before the last item.
    pub aborted: bool,
}

enum Applied {
    Stock,
    SwappedToMerchant,
    SwappedToPlatform,
}

pub struct UpdateDispatcher<'a, U: OfferUpdates> {
    updates: &'a U,
    policy: &'a SyncPolicy,
}

impl<'a, U: OfferUpdates> UpdateDispatcher<'a, U> {
    pub fn new(updates: &'a U, policy: &'a SyncPolicy) -> Self {
        Self { updates, policy }
    }

    /// Applies every decision that requires an API call. Decisions are processed in input order; the cancellation
    /// handle is consulted between items.
    pub async fn dispatch(&self, decisions: &[OfferDecision], cancel: &CancelHandle) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut first = true;
        for item in decisions.iter().filter(|d| d.decision.requires_dispatch()) {
            if cancel.is_cancelled() {
                warn!("🔄️ Dispatch cancelled. Remaining decisions are left unapplied.");
                report.aborted = true;
                break;
            }
            if !first {
                tokio::time::sleep(self.policy.dispatch_delay).await;
            }
            first = false;
            match self.apply(item).await {
                Ok(Applied::Stock) => report.updated += 1,
                Ok(Applied::SwappedToMerchant) => report.swapped_to_merchant += 1,
                Ok(Applied::SwappedToPlatform) => report.swapped_to_platform += 1,
                Err(e) => {
                    warn!("🔄️ Offer {} (EAN {}) could not be updated: {e}", item.offer_id, item.ean);
                    report.failed += 1;
                    if report.failures.len() < self.policy.failure_sample_cap {
                        report.failures.push(ItemResult {
                            offer_id: item.offer_id.clone(),
                            ean: item.ean.clone(),
                            outcome: ItemOutcome::Failed { reason: e.to_string() },
                        });
                    }
                },
            }
        }
        report
    }

    async fn apply(&self, item: &OfferDecision) -> Result<Applied, UpdateError> {
        match &item.decision {
            Decision::SetStock { amount } => {
                self.updates.set_stock(&item.offer_id, *amount).await?;
                Ok(Applied::Stock)
            },
            Decision::SwapToMerchant { publish_stock } => {
                // Swap first; the stock write is only valid once the offer is merchant-managed.
                self.updates.set_channel(&item.offer_id, FulfilmentChannel::Merchant).await?;
                tokio::time::sleep(self.policy.dispatch_delay).await;
                self.updates.set_stock(&item.offer_id, *publish_stock).await?;
                Ok(Applied::SwappedToMerchant)
            },
            Decision::SwapToPlatform => {
                self.updates.set_channel(&item.offer_id, FulfilmentChannel::Platform).await?;
                Ok(Applied::SwappedToPlatform)
            },
            // Filtered out by requires_dispatch
            Decision::NoAction | Decision::Blocked { .. } => {
                Err(UpdateError::Api("Decision does not require dispatch".to_string()))
            },
        }
    }
}

#[cfg(test)]
mod test {
    use mockall::{mock, predicate::eq, Sequence};
    use ssg_common::Ean;

    use super::*;

    mock! {
        pub Updates {}
        impl OfferUpdates for Updates {
            async fn set_stock(&self, offer_id: &str, amount: i64) -> Result<(), UpdateError>;
            async fn set_channel(&self, offer_id: &str, channel: FulfilmentChannel) -> Result<(), UpdateError>;
        }
    }

    fn decision(offer_id: &str, ean: &str, decision: Decision) -> OfferDecision {
        OfferDecision { offer_id: offer_id.to_string(), ean: Ean::try_new(ean).unwrap(), decision }
    }

    fn fast_policy() -> SyncPolicy {
        SyncPolicy { dispatch_delay: std::time::Duration::from_millis(1), ..Default::default() }
    }

    #[tokio::test]
    async fn a_swap_to_merchant_swaps_before_writing_stock() {
        let mut updates = MockUpdates::new();
        let mut seq = Sequence::new();
        updates
            .expect_set_channel()
            .with(eq("ofr-1"), eq(FulfilmentChannel::Merchant))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        updates
            .expect_set_stock()
            .with(eq("ofr-1"), eq(20))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let policy = fast_policy();
        let dispatcher = UpdateDispatcher::new(&updates, &policy);
        let decisions = vec![decision("ofr-1", "8712345678906", Decision::SwapToMerchant { publish_stock: 20 })];
        let report = dispatcher.dispatch(&decisions, &CancelHandle::new()).await;
        assert_eq!(report.swapped_to_merchant, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn a_swap_to_platform_never_writes_stock() {
        let mut updates = MockUpdates::new();
        updates
            .expect_set_channel()
            .with(eq("ofr-2"), eq(FulfilmentChannel::Platform))
            .times(1)
            .returning(|_, _| Ok(()));
        // No set_stock expectation: any stock write panics the mock
        let policy = fast_policy();
        let dispatcher = UpdateDispatcher::new(&updates, &policy);
        let decisions = vec![decision("ofr-2", "8712345678906", Decision::SwapToPlatform)];
        let report = dispatcher.dispatch(&decisions, &CancelHandle::new()).await;
        assert_eq!(report.swapped_to_platform, 1);
    }

    #[tokio::test]
    async fn one_failing_item_does_not_stop_the_others() {
        let mut updates = MockUpdates::new();
        updates
            .expect_set_stock()
            .with(eq("ofr-1"), eq(5))
            .times(1)
            .returning(|_, _| Err(UpdateError::Api("boom".to_string())));
        updates.expect_set_stock().with(eq("ofr-2"), eq(7)).times(1).returning(|_, _| Ok(()));
        let policy = fast_policy();
        let dispatcher = UpdateDispatcher::new(&updates, &policy);
        let decisions = vec![
            decision("ofr-1", "8712345678906", Decision::SetStock { amount: 5 }),
            decision("ofr-2", "8712345678913", Decision::SetStock { amount: 7 }),
        ];
        let report = dispatcher.dispatch(&decisions, &CancelHandle::new()).await;
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].offer_id, "ofr-1");
        assert!(matches!(report.failures[0].outcome, ItemOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn no_action_and_blocked_decisions_reach_no_endpoint() {
        let updates = MockUpdates::new();
        let policy = fast_policy();
        let dispatcher = UpdateDispatcher::new(&updates, &policy);
        let decisions = vec![
            decision("ofr-1", "8712345678906", Decision::NoAction),
            decision("ofr-2", "8712345678913", Decision::Blocked { reason: "below safety stock".to_string() }),
        ];
        let report = dispatcher.dispatch(&decisions, &CancelHandle::new()).await;
        assert_eq!(report.updated + report.failed + report.swapped_to_merchant + report.swapped_to_platform, 0);
    }

    #[tokio::test]
    async fn cancellation_stops_dispatch_between_items() {
        let mut updates = MockUpdates::new();
        let cancel = CancelHandle::new();
        // The first item cancels the run as a side effect; the second must never reach the mock.
        let cancel_clone = cancel.clone();
        updates.expect_set_stock().times(1).returning(move |_, _| {
            cancel_clone.cancel();
            Ok(())
        });
        let policy = fast_policy();
        let dispatcher = UpdateDispatcher::new(&updates, &policy);
        let decisions = vec![
            decision("ofr-1", "8712345678906", Decision::SetStock { amount: 5 }),
            decision("ofr-2", "8712345678913", Decision::SetStock { amount: 7 }),
        ];
        let report = dispatcher.dispatch(&decisions, &cancel).await;
        assert!(report.aborted);
        assert_eq!(report.updated, 1);
    }

    #[tokio::test]
    async fn the_failure_sample_is_capped() {
        let mut updates = MockUpdates::new();
        updates.expect_set_stock().returning(|_, _| Err(UpdateError::Api("boom".to_string())));
        let policy = SyncPolicy {
            dispatch_delay: std::time::Duration::from_millis(1),
            failure_sample_cap: 3,
            ..Default::default()
        };
        let dispatcher = UpdateDispatcher::new(&updates, &policy);
        let decisions: Vec<OfferDecision> = (0..10)
            .map(|i| decision(&format!("ofr-{i}"), "8712345678906", Decision::SetStock { amount: 1 }))
            .collect();
        let report = dispatcher.dispatch(&decisions, &CancelHandle::new()).await;
        assert_eq!(report.failed, 10);
        assert_eq!(report.failures.len(), 3);
    }
}
