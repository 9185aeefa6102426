//! Company-prefixed offer numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Offer number in the form `<PREFIX>-<YEAR>-<SEQ>`, e.g. `ST-2025-001`.
///
/// The sequence is zero-padded to three digits and grows beyond that
/// without truncation (`ST-2025-1000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferNumber(String);

impl OfferNumber {
    /// Builds the number for an issued sequence value.
    pub fn format(prefix: &str, year: i32, sequence: u32) -> Self {
        Self(format!("{}-{}-{:03}", prefix, year, sequence))
    }

    /// Accepts a manually entered number; only emptiness is rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(ValidationError::empty_field("offer_number"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfferNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
