use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------        Ean          ---------------------------------------------------------
/// The article number that joins catalog offers, platform warehouse stock and ERP stock records.
///
/// The marketplace emits GTIN-8 through GTIN-14 codes, so anything between 8 and 14 digits is accepted. Leading
/// zeroes are significant and preserved, which is why this wraps a string rather than an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Ean(String);

#[derive(Debug, Clone, Error)]
#[error("Invalid EAN: {0}")]
pub struct EanError(String);

impl Ean {
    pub fn try_new<S: Into<String>>(value: S) -> Result<Self, EanError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() < 8 || trimmed.len() > 14 {
            return Err(EanError(format!("'{value}' must be 8 to 14 digits long")));
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(EanError(format!("'{value}' contains non-digit characters")));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ean {
    type Err = EanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s)
    }
}

impl TryFrom<String> for Ean {
    type Error = EanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Ean> for String {
    fn from(ean: Ean) -> Self {
        ean.0
    }
}

impl Display for Ean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
