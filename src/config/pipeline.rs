//! Sales pipeline settings

use serde::Deserialize;

use super::error::ValidationError;

/// Business defaults applied by the deal and offer handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Days between sending an offer and its expiration date
    #[serde(default = "default_offer_validity_days")]
    pub offer_validity_days: i64,

    /// Currency assigned to deals created without one
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=365).contains(&self.offer_validity_days) {
            return Err(ValidationError::InvalidOfferValidity);
        }
        let code = self.default_currency.as_str();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            offer_validity_days: default_offer_validity_days(),
            default_currency: default_currency(),
        }
    }
}

fn default_offer_validity_days() -> i64 {
    60
}

fn default_currency() -> String {
    "NOK".to_string()
}
