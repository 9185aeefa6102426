//! HTTP DTOs for offer endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::budget::BudgetLine;
use crate::domain::foundation::{CustomerId, DealId, Timestamp};
use crate::domain::offer::{Offer, OfferPhase};
use crate::domain::project::Project;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOfferRequest {
    pub title: String,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub phase: Option<OfferPhase>,
    #[serde(default)]
    pub probability: Option<u8>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub responsible_user_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub deal_id: Option<DealId>,
}

/// Partial update. `offer_number: null` clears a manual number; leaving the
/// field out keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOfferRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub probability: Option<u8>,
    pub responsible_user_id: Option<String>,
    pub due_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "present")]
    pub offer_number: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcceptOfferRequest {
    #[serde(default)]
    pub create_project: bool,
    #[serde(default)]
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectOfferRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloneOfferRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub include_budget: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceOfferRequest {
    pub phase: OfferPhase,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptOfferResponse {
    pub offer: Offer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloneOfferResponse {
    pub offer: Offer,
    pub lines: Vec<BudgetLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_number_distinguishes_null_from_absent() {
        let absent: UpdateOfferRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.offer_number, None);

        let cleared: UpdateOfferRequest = serde_json::from_str(r#"{"offer_number":null}"#).unwrap();
        assert_eq!(cleared.offer_number, Some(None));

        let set: UpdateOfferRequest =
            serde_json::from_str(r#"{"offer_number":"ST-2025-010"}"#).unwrap();
        assert_eq!(set.offer_number, Some(Some("ST-2025-010".to_string())));
    }

    #[test]
    fn clone_includes_budget_by_default() {
        let req: CloneOfferRequest = serde_json::from_str("{}").unwrap();
        assert!(req.include_budget);
    }
}
