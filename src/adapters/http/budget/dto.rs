//! HTTP DTOs for budget line endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::budget::{BudgetLine, BudgetParentKind, BudgetSummary};
use crate::domain::foundation::{BudgetLineId, CategoryId};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudgetLineRequest {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub margin_override: bool,
    #[serde(default)]
    pub target_margin_percent: Option<f64>,
    #[serde(default)]
    pub display_order: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBudgetLineRequest {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub cost: Option<f64>,
    pub revenue: Option<f64>,
    pub margin_override: Option<bool>,
    pub target_margin_percent: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<BudgetLineId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloneRequest {
    pub source_type: BudgetParentKind,
    pub source_id: uuid::Uuid,
}

/// Pagination switches the list endpoint to a [`crate::ports::Page`] body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLinesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineWithSummaryResponse {
    pub line: BudgetLine,
    pub summary: BudgetSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloneResponse {
    pub lines: Vec<BudgetLine>,
    pub summary: BudgetSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub deleted: u32,
}
