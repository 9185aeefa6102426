//! HTTP DTOs for project endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CustomerId, OfferId, Timestamp};
use crate::domain::project::{Project, ProjectPhase};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub phase: Option<ProjectPhase>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    #[serde(default)]
    pub end_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePhaseRequest {
    pub phase: ProjectPhase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCompletionRequest {
    pub completion_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordSpendRequest {
    pub spent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InheritBudgetRequest {
    pub offer_id: OfferId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionResponse {
    pub project: Project,
    pub auto_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InheritBudgetResponse {
    pub project: Project,
    pub inherited: u32,
}
