//! Project aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::budget::BudgetSummary;
use crate::domain::deal::Deal;
use crate::domain::foundation::{
    Caller, CompanyId, CustomerId, DealId, Modifiable, OfferId, ProjectId, StateMachine,
    Timestamp, UserId, ValidationError,
};
use crate::domain::offer::{Offer, OfferPhase};

use super::{ProjectError, ProjectHealth, ProjectPhase};

/// Input for creating a project by hand.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub company_id: CompanyId,
    pub phase: Option<ProjectPhase>,
    pub value: f64,
    pub manager_id: Option<UserId>,
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

/// Delivered work, optionally materialized from a won offer or deal.
///
/// # Invariants
///
/// - `health` is always `ProjectHealth::classify(spent, value)`
/// - `0 <= completion_percent <= 100`
/// - nothing leaves `completed` or `cancelled`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub company_id: CompanyId,
    pub phase: ProjectPhase,
    /// Budget of the project.
    pub value: f64,
    pub cost: f64,
    pub spent: f64,
    pub completion_percent: f64,
    pub health: ProjectHealth,
    pub has_detailed_budget: bool,
    pub manager_id: Option<UserId>,
    pub created_by: UserId,
    pub description: Option<String>,
    pub deal_id: Option<DealId>,
    pub offer_id: Option<OfferId>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn create(input: NewProject, created_by: &Caller) -> Result<Self, ProjectError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }
        if !input.value.is_finite() || input.value < 0.0 {
            return Err(ValidationError::out_of_range("value", 0.0, f64::MAX, input.value).into());
        }
        let now = Timestamp::now();
        Ok(Self {
            id: ProjectId::new(),
            name,
            customer_id: input.customer_id,
            customer_name: input.customer_name,
            company_id: input.company_id,
            phase: input.phase.unwrap_or(ProjectPhase::Planning),
            value: input.value,
            cost: 0.0,
            spent: 0.0,
            completion_percent: 0.0,
            health: ProjectHealth::classify(0.0, input.value),
            has_detailed_budget: false,
            manager_id: input.manager_id,
            created_by: created_by.user_id.clone(),
            description: input.description,
            deal_id: None,
            offer_id: None,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Project for an accepted offer, named `name` or after the offer.
    pub fn from_won_offer(
        offer: &Offer,
        name: Option<String>,
        created_by: &Caller,
    ) -> Result<Self, ProjectError> {
        let mut project = Self::create(
            NewProject {
                name: name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| offer.title.clone()),
                customer_id: offer.customer_id,
                customer_name: offer.customer_name.clone(),
                company_id: offer.company_id.clone(),
                phase: None,
                value: offer.value,
                manager_id: offer
                    .responsible_user_id
                    .clone()
                    .or_else(|| Some(created_by.user_id.clone())),
                description: offer.description.clone(),
                start_date: None,
                end_date: None,
            },
            created_by,
        )?;
        project.cost = offer.cost;
        project.offer_id = Some(offer.id);
        project.deal_id = offer.deal_id;
        Ok(project)
    }

    /// Project for a won deal with the given budget.
    pub fn from_won_deal(deal: &Deal, budget: f64, created_by: &Caller) -> Result<Self, ProjectError> {
        let mut project = Self::create(
            NewProject {
                name: deal.title.clone(),
                customer_id: Some(deal.customer_id),
                customer_name: deal.customer_name.clone(),
                company_id: deal.company_id.clone(),
                phase: None,
                value: budget,
                manager_id: Some(deal.owner_id.clone()),
                description: deal.description.clone(),
                start_date: None,
                end_date: None,
            },
            created_by,
        )?;
        project.deal_id = Some(deal.id);
        project.offer_id = deal.offer_id;
        Ok(project)
    }

    /// Moves to `target`. Same phase is a no-op and returns `false`.
    pub fn update_phase(&mut self, target: ProjectPhase) -> Result<bool, ProjectError> {
        if target == self.phase {
            return Ok(false);
        }
        if !self.phase.can_transition_to(&target) {
            return Err(ProjectError::InvalidPhaseTransition {
                from: self.phase,
                to: target,
            });
        }
        self.phase = target;
        self.updated_at = Timestamp::now();
        Ok(true)
    }

    /// Sets completion; reaching 100 while active completes the project.
    ///
    /// Returns `true` when the phase was auto-completed.
    pub fn update_completion(&mut self, percent: f64) -> Result<bool, ProjectError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(ProjectError::InvalidCompletionPercent(percent));
        }
        self.completion_percent = percent;
        self.updated_at = Timestamp::now();
        if percent == 100.0 && self.phase == ProjectPhase::Active {
            self.phase = ProjectPhase::Completed;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn record_spend(&mut self, spent: f64) -> Result<(), ProjectError> {
        if !spent.is_finite() || spent < 0.0 {
            return Err(ProjectError::InvalidSpend(spent));
        }
        self.spent = spent;
        self.recalculate_health();
        Ok(())
    }

    pub fn recalculate_health(&mut self) {
        self.health = ProjectHealth::classify(self.spent, self.value);
        self.updated_at = Timestamp::now();
    }

    /// Checks that `offer` may hand its budget to this project and links it.
    ///
    /// A project inherits at most once: a linked project that already
    /// holds a detailed budget is rejected. Value and cost start from the
    /// offer's totals; copying the lines afterwards re-derives them from the
    /// lines themselves.
    pub fn inherit_from(&mut self, offer: &Offer) -> Result<(), ProjectError> {
        if offer.phase != OfferPhase::Won {
            return Err(ProjectError::OfferNotWon(offer.phase));
        }
        if let Some(linked) = self.offer_id {
            if self.has_detailed_budget {
                return Err(ProjectError::BudgetAlreadyInherited(linked));
            }
        }
        self.offer_id = Some(offer.id);
        self.has_detailed_budget = true;
        self.value = offer.value;
        self.cost = offer.cost;
        self.recalculate_health();
        Ok(())
    }

    /// Takes value, cost and the detailed-budget flag from the stored row
    /// and classifies health against that value.
    pub fn keep_budget_totals(&mut self, stored: &Project) {
        self.value = stored.value;
        self.cost = stored.cost;
        self.has_detailed_budget = stored.has_detailed_budget;
        self.health = ProjectHealth::classify(self.spent, self.value);
    }

    /// Mirrors the budget aggregate into value and cost, then re-derives health.
    pub fn apply_budget_summary(&mut self, summary: &BudgetSummary) {
        self.value = summary.total_revenue;
        self.cost = summary.total_cost;
        if !summary.is_empty() {
            self.has_detailed_budget = true;
        }
        self.recalculate_health();
    }
}

impl Modifiable for Project {
    const RESOURCE_TYPE: &'static str = "Project";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn owner(&self) -> Option<&UserId> {
        Some(&self.created_by)
    }

    fn assignee(&self) -> Option<&UserId> {
        self.manager_id.as_ref()
    }

    fn company(&self) -> &CompanyId {
        &self.company_id
    }
}
