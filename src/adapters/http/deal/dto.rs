//! HTTP DTOs for deal endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::budget::BudgetLine;
use crate::domain::deal::{Deal, DealStage, LossReasonCategory, StageHistoryEntry};
use crate::domain::foundation::{CustomerId, OfferId, Timestamp};
use crate::domain::offer::Offer;
use crate::domain::project::Project;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDealRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub probability: Option<u8>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub expected_close_date: Option<Timestamp>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDealRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<Timestamp>,
    pub owner_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceDealRequest {
    pub stage: DealStage,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WinDealRequest {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub create_project: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoseDealRequest {
    pub category: LossReasonCategory,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOfferFromDealRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub template_offer_id: Option<OfferId>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// A deal together with the history entry its transition appended.
#[derive(Debug, Clone, Serialize)]
pub struct DealTransitionResponse {
    pub deal: Deal,
    pub history: StageHistoryEntry,
}

#[derive(Debug, Clone, Serialize)]
pub struct WinDealResponse {
    pub deal: Deal,
    pub history: StageHistoryEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferFromDealResponse {
    pub offer: Offer,
    pub deal: Deal,
    pub lines: Vec<BudgetLine>,
}
