//! The decision function of the pipeline.
//!
//! `reconcile` is pure: given one consistent snapshot of the catalog, the platform warehouse stock and the ERP
//! stock, it computes a [`Decision`] per offer and touches nothing. All stock arithmetic, safety-stock handling and
//! clamping lives here; the dispatcher executes decisions verbatim.

use std::collections::HashMap;

use log::*;
use ssg_common::{Ean, FulfilmentChannel};

use crate::sync_objects::{Decision, FreeStock, OfferDecision, OfferSnapshot, PlatformStock, SyncPolicy};

/// Computes one decision per offer.
///
/// Decision order per offer:
/// 1. An EAN the ERP does not know at all is left alone; there is nothing safe to publish for it.
/// 2. A platform-fulfilled offer whose platform stock has run dry moves to the merchant channel when the ERP has
///    headroom above the safety stock; stock below the safety threshold blocks the swap visibly.
/// 3. A merchant-fulfilled offer moves to the platform channel as soon as the platform holds regular stock again.
///    No stock figure is written with it: the platform owns that channel's stock.
/// 4. A merchant-fulfilled offer that stays put has its published stock aligned with the ERP's free quantity minus
///    safety stock, clamped to the platform maximum.
pub fn reconcile(
    offers: &[OfferSnapshot],
    platform_stock: &HashMap<Ean, PlatformStock>,
    local_stock: &HashMap<Ean, FreeStock>,
    safety_overrides: &HashMap<Ean, i64>,
    policy: &SyncPolicy,
) -> Vec<OfferDecision> {
    offers
        .iter()
        .map(|offer| {
            let decision = decide(offer, platform_stock, local_stock, safety_overrides, policy);
            trace!("🔄️ Offer {} (EAN {}): {:?}", offer.offer_id, offer.ean, decision);
            OfferDecision { offer_id: offer.offer_id.clone(), ean: offer.ean.clone(), decision }
        })
        .collect()
}

fn decide(
    offer: &OfferSnapshot,
    platform_stock: &HashMap<Ean, PlatformStock>,
    local_stock: &HashMap<Ean, FreeStock>,
    safety_overrides: &HashMap<Ean, i64>,
    policy: &SyncPolicy,
) -> Decision {
    let external = platform_stock.get(&offer.ean).map(|s| s.regular).unwrap_or(0);
    let Some(stock) = local_stock.get(&offer.ean) else {
        // The ERP has no record of this product at the reference warehouse.
        return Decision::NoAction;
    };
    let local_free = stock.free();
    let safety = safety_overrides.get(&offer.ean).copied().unwrap_or(policy.default_safety_stock);
    let available_local = (local_free - safety).max(0);
    match offer.channel {
        FulfilmentChannel::Platform if external <= 0 => {
            if available_local > 0 {
                Decision::SwapToMerchant { publish_stock: available_local.min(policy.platform_max_stock) }
            } else if local_free > 0 && local_free <= safety {
                Decision::Blocked {
                    reason: format!("local stock ({local_free}) exists but is below the safety stock ({safety})"),
                }
            } else {
                Decision::NoAction
            }
        },
        // The platform still holds stock; its channel, its problem.
        FulfilmentChannel::Platform => Decision::NoAction,
        FulfilmentChannel::Merchant if external > 0 => Decision::SwapToPlatform,
        FulfilmentChannel::Merchant => {
            if available_local != offer.published_stock {
                Decision::SetStock { amount: available_local.min(policy.platform_max_stock) }
            } else {
                Decision::NoAction
            }
        },
    }
}
