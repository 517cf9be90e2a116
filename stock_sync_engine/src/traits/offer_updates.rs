use ssg_common::FulfilmentChannel;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum UpdateError {
    #[error("The marketplace rate limit budget was exhausted: {0}")]
    RateLimited(String),
    #[error("Marketplace API error: {0}")]
    Api(String),
}

/// Write side of the marketplace: per-offer stock and channel updates.
///
/// Calls are issued strictly sequentially by the dispatcher; implementations need no internal pacing beyond the
/// client's own 429 retry.
#[allow(async_fn_in_trait)]
pub trait OfferUpdates {
    /// Publish a stock figure for a merchant-managed offer.
    async fn set_stock(&self, offer_id: &str, amount: i64) -> Result<(), UpdateError>;

    /// Move an offer to the given fulfilment channel.
    async fn set_channel(&self, offer_id: &str, channel: FulfilmentChannel) -> Result<(), UpdateError>;
}
