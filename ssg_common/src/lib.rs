mod channel;
mod ean;
pub mod helpers;
mod secret;

pub use channel::FulfilmentChannel;
pub use ean::{Ean, EanError};
pub use secret::Secret;
