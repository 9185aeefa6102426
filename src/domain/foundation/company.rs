//! Company identity and the offer-number prefix table.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Prefix used when a company has no dedicated entry.
pub const DEFAULT_COMPANY_PREFIX: &str = "GR";

/// Identifier of one company in the group (e.g. `stalbygg`, `tak`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    pub const GRUPPEN: &'static str = "gruppen";
    pub const STALBYGG: &'static str = "stalbygg";
    pub const HYBRIDBYGG: &'static str = "hybridbygg";
    pub const INDUSTRI: &'static str = "industri";
    pub const TAK: &'static str = "tak";
    pub const MONTASJE: &'static str = "montasje";

    /// Creates a company id, normalizing to lowercase.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into().trim().to_lowercase();
        if id.is_empty() {
            return Err(ValidationError::empty_field("company_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the six companies of the group.
    pub fn is_known(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::GRUPPEN
                | Self::STALBYGG
                | Self::HYBRIDBYGG
                | Self::INDUSTRI
                | Self::TAK
                | Self::MONTASJE
        )
    }

    /// Offer-number prefix for this company.
    pub fn prefix(&self) -> &'static str {
        company_prefix(self.as_str())
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Looks up the two-letter offer-number prefix for a company id.
///
/// Unknown ids fall back to [`DEFAULT_COMPANY_PREFIX`].
pub fn company_prefix(company_id: &str) -> &'static str {
    match company_id {
        CompanyId::STALBYGG => "ST",
        CompanyId::HYBRIDBYGG => "HB",
        CompanyId::INDUSTRI => "IN",
        CompanyId::TAK => "TK",
        CompanyId::MONTASJE => "MO",
        CompanyId::GRUPPEN => "GR",
        _ => DEFAULT_COMPANY_PREFIX,
    }
}
