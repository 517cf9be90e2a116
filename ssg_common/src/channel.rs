use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Who fulfils an offer: the merchant's own warehouse, or the platform's.
///
/// Once an offer is on the platform channel, the platform owns its stock figure and rejects externally submitted
/// stock writes for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfilmentChannel {
    /// Fulfilled from the merchant's reference warehouse (wire token `FBM`).
    Merchant,
    /// Fulfilled from the platform's warehouse (wire token `FBP`).
    Platform,
}

impl FulfilmentChannel {
    /// The token used both in the export CSV's `fulfilmentType` column and in the fulfilment update endpoint.
    pub fn wire_token(&self) -> &'static str {
        match self {
            Self::Merchant => "FBM",
            Self::Platform => "FBP",
        }
    }

    pub fn from_wire_token(token: &str) -> Option<Self> {
        match token.trim() {
            "FBM" => Some(Self::Merchant),
            "FBP" => Some(Self::Platform),
            _ => None,
        }
    }
}

impl Display for FulfilmentChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merchant => f.write_str("merchant"),
            Self::Platform => f.write_str("platform"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_tokens_round_trip() {
        assert_eq!(FulfilmentChannel::from_wire_token("FBM"), Some(FulfilmentChannel::Merchant));
        assert_eq!(FulfilmentChannel::from_wire_token("FBP"), Some(FulfilmentChannel::Platform));
        assert_eq!(FulfilmentChannel::from_wire_token(" FBP "), Some(FulfilmentChannel::Platform));
        assert_eq!(FulfilmentChannel::from_wire_token("fbm"), None);
        assert_eq!(FulfilmentChannel::from_wire_token("FBX"), None);
    }
}
