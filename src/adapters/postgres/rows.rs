//! Database rows and their conversion into domain types.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::budget::{
    BudgetCategory, BudgetLine, BudgetParent, BudgetParentKind, LineDetails, LineName,
};
use crate::domain::deal::{Deal, StageHistoryEntry};
use crate::domain::foundation::{
    BudgetLineId, CategoryId, CompanyId, CustomerId, DealId, DomainError, ErrorCode, OfferId,
    ProjectId, StageHistoryId, Timestamp, UserId,
};
use crate::domain::offer::{Offer, OfferNumber};
use crate::domain::project::Project;

pub(super) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DomainError::new(ErrorCode::Conflict, format!("{}: {}", context, db.message()));
        }
    }
    DomainError::database(context, err)
}

fn corrupt(column: &str, cause: impl Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid value in column '{}': {}", column, cause),
    )
}

fn parse<T>(column: &str, value: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| corrupt(column, e))
}

fn user(column: &str, value: String) -> Result<UserId, DomainError> {
    UserId::new(value).map_err(|e| corrupt(column, e))
}

fn optional_user(column: &str, value: Option<String>) -> Result<Option<UserId>, DomainError> {
    value.map(|v| user(column, v)).transpose()
}

fn company(value: String) -> Result<CompanyId, DomainError> {
    CompanyId::new(value).map_err(|e| corrupt("company_id", e))
}

fn percent(column: &str, value: i16) -> Result<u8, DomainError> {
    u8::try_from(value).map_err(|e| corrupt(column, e))
}

fn ts(value: Option<DateTime<Utc>>) -> Option<Timestamp> {
    value.map(Timestamp::from_datetime)
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct DealRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    customer_id: Uuid,
    customer_name: Option<String>,
    company_id: String,
    stage: String,
    probability: i16,
    value: f64,
    currency: String,
    owner_id: String,
    created_by: String,
    expected_close_date: Option<DateTime<Utc>>,
    actual_close_date: Option<DateTime<Utc>>,
    source: Option<String>,
    notes: Option<String>,
    lost_reason: Option<String>,
    loss_reason_category: Option<String>,
    offer_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DealRow> for Deal {
    type Error = DomainError;

    fn try_from(row: DealRow) -> Result<Self, Self::Error> {
        Ok(Deal {
            id: DealId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            customer_id: CustomerId::from_uuid(row.customer_id),
            customer_name: row.customer_name,
            company_id: company(row.company_id)?,
            stage: parse("stage", &row.stage)?,
            probability: percent("probability", row.probability)?,
            value: row.value,
            currency: row.currency,
            owner_id: user("owner_id", row.owner_id)?,
            created_by: user("created_by", row.created_by)?,
            expected_close_date: ts(row.expected_close_date),
            actual_close_date: ts(row.actual_close_date),
            source: row.source,
            notes: row.notes,
            lost_reason: row.lost_reason,
            loss_reason_category: row
                .loss_reason_category
                .as_deref()
                .map(|v| parse("loss_reason_category", v))
                .transpose()?,
            offer_id: row.offer_id.map(OfferId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct StageHistoryRow {
    id: Uuid,
    deal_id: Uuid,
    from_stage: Option<String>,
    to_stage: String,
    changed_by: String,
    changed_by_name: String,
    notes: Option<String>,
    changed_at: DateTime<Utc>,
}

impl TryFrom<StageHistoryRow> for StageHistoryEntry {
    type Error = DomainError;

    fn try_from(row: StageHistoryRow) -> Result<Self, Self::Error> {
        Ok(StageHistoryEntry {
            id: StageHistoryId::from_uuid(row.id),
            deal_id: DealId::from_uuid(row.deal_id),
            from_stage: row
                .from_stage
                .as_deref()
                .map(|v| parse("from_stage", v))
                .transpose()?,
            to_stage: parse("to_stage", &row.to_stage)?,
            changed_by: user("changed_by", row.changed_by)?,
            changed_by_name: row.changed_by_name,
            notes: row.notes,
            changed_at: Timestamp::from_datetime(row.changed_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OfferRow {
    id: Uuid,
    title: String,
    offer_number: Option<String>,
    customer_id: Option<Uuid>,
    customer_name: Option<String>,
    company_id: String,
    deal_id: Option<Uuid>,
    project_id: Option<Uuid>,
    phase: String,
    probability: i16,
    value: f64,
    cost: f64,
    margin_percent: f64,
    has_detailed_budget: bool,
    responsible_user_id: Option<String>,
    created_by: String,
    description: Option<String>,
    notes: Option<String>,
    due_date: Option<DateTime<Utc>>,
    sent_date: Option<DateTime<Utc>>,
    expiration_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = DomainError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        Ok(Offer {
            id: OfferId::from_uuid(row.id),
            title: row.title,
            offer_number: row
                .offer_number
                .map(|n| OfferNumber::new(n).map_err(|e| corrupt("offer_number", e)))
                .transpose()?,
            customer_id: row.customer_id.map(CustomerId::from_uuid),
            customer_name: row.customer_name,
            company_id: company(row.company_id)?,
            deal_id: row.deal_id.map(DealId::from_uuid),
            project_id: row.project_id.map(ProjectId::from_uuid),
            phase: parse("phase", &row.phase)?,
            probability: percent("probability", row.probability)?,
            value: row.value,
            cost: row.cost,
            margin_percent: row.margin_percent,
            has_detailed_budget: row.has_detailed_budget,
            responsible_user_id: optional_user("responsible_user_id", row.responsible_user_id)?,
            created_by: user("created_by", row.created_by)?,
            description: row.description,
            notes: row.notes,
            due_date: ts(row.due_date),
            sent_date: ts(row.sent_date),
            expiration_date: ts(row.expiration_date),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProjectRow {
    id: Uuid,
    name: String,
    customer_id: Option<Uuid>,
    customer_name: Option<String>,
    company_id: String,
    phase: String,
    value: f64,
    cost: f64,
    spent: f64,
    completion_percent: f64,
    health: String,
    has_detailed_budget: bool,
    manager_id: Option<String>,
    created_by: String,
    description: Option<String>,
    deal_id: Option<Uuid>,
    offer_id: Option<Uuid>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DomainError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: ProjectId::from_uuid(row.id),
            name: row.name,
            customer_id: row.customer_id.map(CustomerId::from_uuid),
            customer_name: row.customer_name,
            company_id: company(row.company_id)?,
            phase: parse("phase", &row.phase)?,
            value: row.value,
            cost: row.cost,
            spent: row.spent,
            completion_percent: row.completion_percent,
            health: parse("health", &row.health)?,
            has_detailed_budget: row.has_detailed_budget,
            manager_id: optional_user("manager_id", row.manager_id)?,
            created_by: user("created_by", row.created_by)?,
            description: row.description,
            deal_id: row.deal_id.map(DealId::from_uuid),
            offer_id: row.offer_id.map(OfferId::from_uuid),
            start_date: ts(row.start_date),
            end_date: ts(row.end_date),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct BudgetLineRow {
    id: Uuid,
    parent_type: String,
    parent_id: Uuid,
    category_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    cost: f64,
    revenue: f64,
    margin_override: bool,
    target_margin_percent: Option<f64>,
    display_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BudgetLineRow> for BudgetLine {
    type Error = DomainError;

    fn try_from(row: BudgetLineRow) -> Result<Self, Self::Error> {
        let kind: BudgetParentKind = parse("parent_type", &row.parent_type)?;
        let name = match row.category_id {
            Some(id) => LineName::Category {
                id: CategoryId::from_uuid(id),
                name: row.name,
            },
            None => LineName::Custom { name: row.name },
        };

        Ok(BudgetLine {
            id: BudgetLineId::from_uuid(row.id),
            parent: BudgetParent::from_parts(kind, row.parent_id),
            name,
            details: LineDetails {
                description: row.description,
                quantity: row.quantity,
                unit: row.unit,
            },
            cost: row.cost,
            revenue: row.revenue,
            margin_override: row.margin_override,
            target_margin_percent: row.target_margin_percent,
            display_order: u32::try_from(row.display_order)
                .map_err(|e| corrupt("display_order", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CategoryRow {
    id: Uuid,
    name: String,
    is_active: bool,
}

impl From<CategoryRow> for BudgetCategory {
    fn from(row: CategoryRow) -> Self {
        BudgetCategory {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            is_active: row.is_active,
        }
    }
}

pub(super) const DEAL_COLUMNS: &str = "id, title, description, customer_id, customer_name, \
    company_id, stage, probability, value, currency, owner_id, created_by, expected_close_date, \
    actual_close_date, source, notes, lost_reason, loss_reason_category, offer_id, created_at, \
    updated_at";

pub(super) const OFFER_COLUMNS: &str = "id, title, offer_number, customer_id, customer_name, \
    company_id, deal_id, project_id, phase, probability, value, cost, margin_percent, \
    has_detailed_budget, responsible_user_id, created_by, description, notes, due_date, \
    sent_date, expiration_date, created_at, updated_at";

pub(super) const PROJECT_COLUMNS: &str = "id, name, customer_id, customer_name, company_id, \
    phase, value, cost, spent, completion_percent, health, has_detailed_budget, manager_id, \
    created_by, description, deal_id, offer_id, start_date, end_date, created_at, updated_at";

pub(super) const LINE_COLUMNS: &str = "id, parent_type, parent_id, category_id, name, \
    description, quantity, unit, cost, revenue, margin_override, target_margin_percent, \
    display_order, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deal::DealStage;
    use crate::domain::project::{ProjectHealth, ProjectPhase};

    fn deal_row() -> DealRow {
        let now = Utc::now();
        DealRow {
            id: Uuid::new_v4(),
            title: "Warehouse extension".to_string(),
            description: None,
            customer_id: Uuid::new_v4(),
            customer_name: Some("Acme".to_string()),
            company_id: "stalbygg".to_string(),
            stage: "proposal".to_string(),
            probability: 50,
            value: 250_000.0,
            currency: "NOK".to_string(),
            owner_id: "user-1".to_string(),
            created_by: "user-1".to_string(),
            expected_close_date: None,
            actual_close_date: None,
            source: None,
            notes: None,
            lost_reason: None,
            loss_reason_category: None,
            offer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn deal_row_converts() {
        let deal = Deal::try_from(deal_row()).unwrap();
        assert_eq!(deal.stage, DealStage::Proposal);
        assert_eq!(deal.probability, 50);
        assert_eq!(deal.company_id.as_str(), "stalbygg");
    }

    #[test]
    fn unknown_stage_is_reported_as_database_error() {
        let mut row = deal_row();
        row.stage = "pondering".to_string();
        let err = Deal::try_from(row).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("stage"));
    }

    #[test]
    fn negative_probability_is_rejected() {
        let mut row = deal_row();
        row.probability = -5;
        assert!(Deal::try_from(row).is_err());
    }

    #[test]
    fn line_with_category_gets_category_name() {
        let now = Utc::now();
        let category = Uuid::new_v4();
        let line = BudgetLine::try_from(BudgetLineRow {
            id: Uuid::new_v4(),
            parent_type: "offer".to_string(),
            parent_id: Uuid::new_v4(),
            category_id: Some(category),
            name: "Steel".to_string(),
            description: None,
            quantity: Some(3.0),
            unit: Some("t".to_string()),
            cost: 100.0,
            revenue: 150.0,
            margin_override: false,
            target_margin_percent: None,
            display_order: 2,
            created_at: now,
            updated_at: now,
        })
        .unwrap();

        assert_eq!(line.name.category_id(), Some(CategoryId::from_uuid(category)));
        assert_eq!(line.name.as_str(), "Steel");
        assert!(matches!(line.parent, BudgetParent::Offer(_)));
        assert_eq!(line.display_order, 2);
    }

    #[test]
    fn project_row_parses_phase_and_health() {
        let now = Utc::now();
        let project = Project::try_from(ProjectRow {
            id: Uuid::new_v4(),
            name: "Roof".to_string(),
            customer_id: None,
            customer_name: None,
            company_id: "TAK".to_string(),
            phase: "active".to_string(),
            value: 100.0,
            cost: 80.0,
            spent: 115.0,
            completion_percent: 40.0,
            health: "at_risk".to_string(),
            has_detailed_budget: true,
            manager_id: None,
            created_by: "user-1".to_string(),
            description: None,
            deal_id: None,
            offer_id: None,
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        })
        .unwrap();

        assert_eq!(project.phase, ProjectPhase::Active);
        assert_eq!(project.health, ProjectHealth::AtRisk);
        assert_eq!(project.company_id.as_str(), "tak");
    }
}
