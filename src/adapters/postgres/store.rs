//! PostgreSQL implementation of the read ports, the offer-number sequence
//! and the unit of work.

use async_trait::async_trait;
use sqlx::postgres::PgQueryResult;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::domain::budget::{BudgetCategory, BudgetLine, BudgetParent, BudgetSummary};
use crate::domain::deal::{Deal, StageHistoryEntry};
use crate::domain::foundation::{
    BudgetLineId, CategoryId, CompanyId, DealId, DomainError, ErrorCode, OfferId, ProjectId,
};
use crate::domain::offer::Offer;
use crate::domain::project::Project;
use crate::ports::{
    BudgetCategoryReader, BudgetLineReader, Change, ChangeSet, CommitOutcome, DealReader,
    NumberSequence, OfferReader, Page, PageRequest, ProjectReader, StageHistoryReader, UnitOfWork,
};

use super::rows::{
    db_error, BudgetLineRow, CategoryRow, DealRow, OfferRow, ProjectRow, StageHistoryRow,
    DEAL_COLUMNS, LINE_COLUMNS, OFFER_COLUMNS, PROJECT_COLUMNS,
};

/// PostgreSQL-backed persistence for deals, offers, projects and budget lines.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn ensure_affected(
    result: PgQueryResult,
    code: ErrorCode,
    what: &str,
    id: impl std::fmt::Display,
) -> Result<(), DomainError> {
    if result.rows_affected() == 0 {
        return Err(DomainError::new(code, format!("{} {} not found", what, id)));
    }
    Ok(())
}

async fn fetch_offer(conn: &mut PgConnection, id: &OfferId) -> Result<Option<Offer>, DomainError> {
    let row: Option<OfferRow> =
        sqlx::query_as(&format!("SELECT {} FROM offers WHERE id = $1", OFFER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error("Failed to load offer", e))?;
    row.map(Offer::try_from).transpose()
}

async fn fetch_project(conn: &mut PgConnection, id: &ProjectId) -> Result<Option<Project>, DomainError> {
    let row: Option<ProjectRow> =
        sqlx::query_as(&format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error("Failed to load project", e))?;
    row.map(Project::try_from).transpose()
}

/// Loads the offer and holds its row lock until the transaction ends.
async fn lock_offer(conn: &mut PgConnection, id: &OfferId) -> Result<Offer, DomainError> {
    let row: Option<OfferRow> = sqlx::query_as(&format!(
        "SELECT {} FROM offers WHERE id = $1 FOR UPDATE",
        OFFER_COLUMNS
    ))
    .bind(id.as_uuid())
    .fetch_optional(conn)
    .await
    .map_err(|e| db_error("Failed to lock offer", e))?;
    let row = row.ok_or_else(|| {
        DomainError::new(ErrorCode::OfferNotFound, format!("offer {} not found", id))
    })?;
    Offer::try_from(row)
}

/// Loads the project and holds its row lock until the transaction ends.
async fn lock_project(conn: &mut PgConnection, id: &ProjectId) -> Result<Project, DomainError> {
    let row: Option<ProjectRow> = sqlx::query_as(&format!(
        "SELECT {} FROM projects WHERE id = $1 FOR UPDATE",
        PROJECT_COLUMNS
    ))
    .bind(id.as_uuid())
    .fetch_optional(conn)
    .await
    .map_err(|e| db_error("Failed to lock project", e))?;
    let row = row.ok_or_else(|| {
        DomainError::new(ErrorCode::ProjectNotFound, format!("project {} not found", id))
    })?;
    Project::try_from(row)
}

async fn fetch_lines(conn: &mut PgConnection, parent: &BudgetParent) -> Result<Vec<BudgetLine>, DomainError> {
    let rows: Vec<BudgetLineRow> = sqlx::query_as(&format!(
        "SELECT {} FROM budget_lines WHERE parent_type = $1 AND parent_id = $2 \
         ORDER BY display_order, created_at",
        LINE_COLUMNS
    ))
    .bind(parent.kind().as_str())
    .bind(parent.id())
    .fetch_all(conn)
    .await
    .map_err(|e| db_error("Failed to list budget lines", e))?;
    rows.into_iter().map(BudgetLine::try_from).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Readers
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl DealReader for PostgresStore {
    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DomainError> {
        let row: Option<DealRow> =
            sqlx::query_as(&format!("SELECT {} FROM deals WHERE id = $1", DEAL_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to load deal", e))?;
        row.map(Deal::try_from).transpose()
    }
}

#[async_trait]
impl StageHistoryReader for PostgresStore {
    async fn list_for_deal(&self, deal_id: &DealId) -> Result<Vec<StageHistoryEntry>, DomainError> {
        let rows: Vec<StageHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, deal_id, from_stage, to_stage, changed_by, changed_by_name, notes, changed_at
            FROM deal_stage_history
            WHERE deal_id = $1
            ORDER BY changed_at DESC, seq DESC
            "#,
        )
        .bind(deal_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list stage history", e))?;
        rows.into_iter().map(StageHistoryEntry::try_from).collect()
    }
}

#[async_trait]
impl OfferReader for PostgresStore {
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        fetch_offer(&mut conn, id).await
    }
}

#[async_trait]
impl ProjectReader for PostgresStore {
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        fetch_project(&mut conn, id).await
    }
}

#[async_trait]
impl BudgetLineReader for PostgresStore {
    async fn find_by_id(&self, id: &BudgetLineId) -> Result<Option<BudgetLine>, DomainError> {
        let row: Option<BudgetLineRow> =
            sqlx::query_as(&format!("SELECT {} FROM budget_lines WHERE id = $1", LINE_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to load budget line", e))?;
        row.map(BudgetLine::try_from).transpose()
    }

    async fn list_by_parent(&self, parent: &BudgetParent) -> Result<Vec<BudgetLine>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        fetch_lines(&mut conn, parent).await
    }

    async fn list_by_parent_paginated(
        &self,
        parent: &BudgetParent,
        request: PageRequest,
    ) -> Result<Page<BudgetLine>, DomainError> {
        let total = self.count_by_parent(parent).await?;
        let rows: Vec<BudgetLineRow> = sqlx::query_as(&format!(
            "SELECT {} FROM budget_lines WHERE parent_type = $1 AND parent_id = $2 \
             ORDER BY display_order, created_at LIMIT $3 OFFSET $4",
            LINE_COLUMNS
        ))
        .bind(parent.kind().as_str())
        .bind(parent.id())
        .bind(i64::from(request.page_size()))
        .bind(request.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to page budget lines", e))?;

        let items = rows
            .into_iter()
            .map(BudgetLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, u64::from(total), request))
    }

    async fn count_by_parent(&self, parent: &BudgetParent) -> Result<u32, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM budget_lines WHERE parent_type = $1 AND parent_id = $2",
        )
        .bind(parent.kind().as_str())
        .bind(parent.id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count budget lines", e))?;
        Ok(count as u32)
    }
}

#[async_trait]
impl BudgetCategoryReader for PostgresStore {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<BudgetCategory>, DomainError> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, is_active FROM budget_categories WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to load budget category", e))?;
        Ok(row.map(BudgetCategory::from))
    }
}

#[async_trait]
impl NumberSequence for PostgresStore {
    async fn next_value(&self, company: &CompanyId, year: i32) -> Result<u32, DomainError> {
        // Row lock on the (company, year) counter serializes concurrent callers.
        let value: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO offer_number_sequences (company_id, year, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (company_id, year)
            DO UPDATE SET last_value = offer_number_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(company.as_str())
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to issue offer number", e))?;
        Ok(value as u32)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Unit of work
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl UnitOfWork for PostgresStore {
    async fn commit(&self, changes: ChangeSet) -> Result<CommitOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        let mut outcome = CommitOutcome::default();
        let count = changes.len();

        for change in changes.into_changes() {
            // Dropping the transaction on error rolls it back.
            apply(&mut *tx, change, &mut outcome).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        debug!(changes = count, "change set committed");
        Ok(outcome)
    }
}

async fn apply(
    conn: &mut PgConnection,
    change: Change,
    outcome: &mut CommitOutcome,
) -> Result<(), DomainError> {
    match change {
        Change::InsertDeal(deal) => write_deal(conn, &deal, true).await,
        Change::UpdateDeal(deal) => write_deal(conn, &deal, false).await,
        Change::InsertOffer(offer) => insert_offer(conn, &offer).await,
        Change::UpdateOffer(offer) => update_offer(conn, &offer).await,
        Change::InsertProject(project) => insert_project(conn, &project).await,
        Change::UpdateProject(mut project) => {
            let stored = lock_project(&mut *conn, &project.id).await?;
            project.keep_budget_totals(&stored);
            update_project(conn, &project).await
        }
        Change::SetProjectBudget(project) => write_project_budget(conn, &project).await,
        Change::InsertBudgetLine(line) => insert_line(conn, &line).await,
        Change::UpdateBudgetLine(line) => update_line(conn, &line).await,
        Change::DeleteBudgetLine(id) => {
            let result = sqlx::query("DELETE FROM budget_lines WHERE id = $1")
                .bind(id.as_uuid())
                .execute(conn)
                .await
                .map_err(|e| db_error("Failed to delete budget line", e))?;
            ensure_affected(result, ErrorCode::BudgetLineNotFound, "budget line", id)
        }
        Change::DeleteBudgetLinesByParent(parent) => {
            sqlx::query("DELETE FROM budget_lines WHERE parent_type = $1 AND parent_id = $2")
                .bind(parent.kind().as_str())
                .bind(parent.id())
                .execute(conn)
                .await
                .map_err(|e| db_error("Failed to delete budget lines", e))?;
            Ok(())
        }
        Change::ReorderBudgetLines {
            parent,
            ordered_ids,
        } => {
            for (position, id) in ordered_ids.iter().enumerate() {
                let result = sqlx::query(
                    r#"
                    UPDATE budget_lines SET display_order = $4, updated_at = NOW()
                    WHERE id = $1 AND parent_type = $2 AND parent_id = $3
                    "#,
                )
                .bind(id.as_uuid())
                .bind(parent.kind().as_str())
                .bind(parent.id())
                .bind(position as i32)
                .execute(&mut *conn)
                .await
                .map_err(|e| db_error("Failed to reorder budget lines", e))?;
                ensure_affected(result, ErrorCode::BudgetLineNotFound, "budget line", id)?;
            }
            Ok(())
        }
        Change::RecomputeParentAggregate(parent) => {
            // Lock the parent before summing so concurrent line writers
            // recompute one after another.
            let summary = match parent {
                BudgetParent::Offer(id) => {
                    let mut offer = lock_offer(&mut *conn, &id).await?;
                    let summary = BudgetSummary::from_lines(&fetch_lines(&mut *conn, &parent).await?);
                    offer.apply_budget_summary(&summary);
                    write_offer_budget(conn, &offer).await?;
                    summary
                }
                BudgetParent::Project(id) => {
                    let mut project = lock_project(&mut *conn, &id).await?;
                    let summary = BudgetSummary::from_lines(&fetch_lines(&mut *conn, &parent).await?);
                    project.apply_budget_summary(&summary);
                    write_project_budget(conn, &project).await?;
                    summary
                }
            };
            outcome.recomputed.push((parent, summary));
            Ok(())
        }
        Change::AppendStageHistory(entry) => {
            sqlx::query(
                r#"
                INSERT INTO deal_stage_history (
                    id, deal_id, from_stage, to_stage, changed_by, changed_by_name, notes, changed_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(entry.id.as_uuid())
            .bind(entry.deal_id.as_uuid())
            .bind(entry.from_stage.as_ref().map(|s| s.as_str()))
            .bind(entry.to_stage.as_str())
            .bind(entry.changed_by.as_str())
            .bind(&entry.changed_by_name)
            .bind(&entry.notes)
            .bind(entry.changed_at.as_datetime())
            .execute(conn)
            .await
            .map_err(|e| db_error("Failed to append stage history", e))?;
            Ok(())
        }
    }
}

async fn write_deal(conn: &mut PgConnection, deal: &Deal, insert: bool) -> Result<(), DomainError> {
    let sql = if insert {
        format!(
            "INSERT INTO deals ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
             $13, $14, $15, $16, $17, $18, $19, $20, $21)",
            DEAL_COLUMNS
        )
    } else {
        r#"
        UPDATE deals SET
            title = $2, description = $3, customer_id = $4, customer_name = $5,
            company_id = $6, stage = $7, probability = $8, value = $9, currency = $10,
            owner_id = $11, created_by = $12, expected_close_date = $13,
            actual_close_date = $14, source = $15, notes = $16, lost_reason = $17,
            loss_reason_category = $18, offer_id = $19, created_at = $20, updated_at = $21
        WHERE id = $1
        "#
        .to_string()
    };

    let result = sqlx::query(&sql)
        .bind(deal.id.as_uuid())
        .bind(&deal.title)
        .bind(&deal.description)
        .bind(deal.customer_id.as_uuid())
        .bind(&deal.customer_name)
        .bind(deal.company_id.as_str())
        .bind(deal.stage.as_str())
        .bind(i16::from(deal.probability))
        .bind(deal.value)
        .bind(&deal.currency)
        .bind(deal.owner_id.as_str())
        .bind(deal.created_by.as_str())
        .bind(deal.expected_close_date.as_ref().map(|t| *t.as_datetime()))
        .bind(deal.actual_close_date.as_ref().map(|t| *t.as_datetime()))
        .bind(&deal.source)
        .bind(&deal.notes)
        .bind(&deal.lost_reason)
        .bind(deal.loss_reason_category.as_ref().map(|c| c.as_str()))
        .bind(deal.offer_id.map(|id| *id.as_uuid()))
        .bind(deal.created_at.as_datetime())
        .bind(deal.updated_at.as_datetime())
        .execute(conn)
        .await
        .map_err(|e| db_error("Failed to write deal", e))?;
    ensure_affected(result, ErrorCode::DealNotFound, "deal", deal.id)
}

async fn insert_offer(conn: &mut PgConnection, offer: &Offer) -> Result<(), DomainError> {
    sqlx::query(&format!(
        "INSERT INTO offers ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
         $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)",
        OFFER_COLUMNS
    ))
    .bind(offer.id.as_uuid())
    .bind(&offer.title)
    .bind(offer.offer_number.as_ref().map(|n| n.as_str()))
    .bind(offer.customer_id.map(|id| *id.as_uuid()))
    .bind(&offer.customer_name)
    .bind(offer.company_id.as_str())
    .bind(offer.deal_id.map(|id| *id.as_uuid()))
    .bind(offer.project_id.map(|id| *id.as_uuid()))
    .bind(offer.phase.as_str())
    .bind(i16::from(offer.probability))
    .bind(offer.value)
    .bind(offer.cost)
    .bind(offer.margin_percent)
    .bind(offer.has_detailed_budget)
    .bind(offer.responsible_user_id.as_ref().map(|u| u.as_str()))
    .bind(offer.created_by.as_str())
    .bind(&offer.description)
    .bind(&offer.notes)
    .bind(offer.due_date.as_ref().map(|t| *t.as_datetime()))
    .bind(offer.sent_date.as_ref().map(|t| *t.as_datetime()))
    .bind(offer.expiration_date.as_ref().map(|t| *t.as_datetime()))
    .bind(offer.created_at.as_datetime())
    .bind(offer.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to insert offer", e))?;
    Ok(())
}

/// Writes every column except the budget totals, which only
/// [`write_offer_budget`] touches.
async fn update_offer(conn: &mut PgConnection, offer: &Offer) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE offers SET
            title = $2, offer_number = $3, customer_id = $4, customer_name = $5,
            company_id = $6, deal_id = $7, project_id = $8, phase = $9, probability = $10,
            responsible_user_id = $11, created_by = $12, description = $13, notes = $14,
            due_date = $15, sent_date = $16, expiration_date = $17, created_at = $18,
            updated_at = $19
        WHERE id = $1
        "#,
    )
    .bind(offer.id.as_uuid())
    .bind(&offer.title)
    .bind(offer.offer_number.as_ref().map(|n| n.as_str()))
    .bind(offer.customer_id.map(|id| *id.as_uuid()))
    .bind(&offer.customer_name)
    .bind(offer.company_id.as_str())
    .bind(offer.deal_id.map(|id| *id.as_uuid()))
    .bind(offer.project_id.map(|id| *id.as_uuid()))
    .bind(offer.phase.as_str())
    .bind(i16::from(offer.probability))
    .bind(offer.responsible_user_id.as_ref().map(|u| u.as_str()))
    .bind(offer.created_by.as_str())
    .bind(&offer.description)
    .bind(&offer.notes)
    .bind(offer.due_date.as_ref().map(|t| *t.as_datetime()))
    .bind(offer.sent_date.as_ref().map(|t| *t.as_datetime()))
    .bind(offer.expiration_date.as_ref().map(|t| *t.as_datetime()))
    .bind(offer.created_at.as_datetime())
    .bind(offer.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to update offer", e))?;
    ensure_affected(result, ErrorCode::OfferNotFound, "offer", offer.id)
}

async fn write_offer_budget(conn: &mut PgConnection, offer: &Offer) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE offers SET
            value = $2, cost = $3, margin_percent = $4, has_detailed_budget = $5, updated_at = $6
        WHERE id = $1
        "#,
    )
    .bind(offer.id.as_uuid())
    .bind(offer.value)
    .bind(offer.cost)
    .bind(offer.margin_percent)
    .bind(offer.has_detailed_budget)
    .bind(offer.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to write offer totals", e))?;
    ensure_affected(result, ErrorCode::OfferNotFound, "offer", offer.id)
}

async fn insert_project(conn: &mut PgConnection, project: &Project) -> Result<(), DomainError> {
    sqlx::query(&format!(
        "INSERT INTO projects ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, \
         $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
        PROJECT_COLUMNS
    ))
    .bind(project.id.as_uuid())
    .bind(&project.name)
    .bind(project.customer_id.map(|id| *id.as_uuid()))
    .bind(&project.customer_name)
    .bind(project.company_id.as_str())
    .bind(project.phase.as_str())
    .bind(project.value)
    .bind(project.cost)
    .bind(project.spent)
    .bind(project.completion_percent)
    .bind(project.health.as_str())
    .bind(project.has_detailed_budget)
    .bind(project.manager_id.as_ref().map(|u| u.as_str()))
    .bind(project.created_by.as_str())
    .bind(&project.description)
    .bind(project.deal_id.map(|id| *id.as_uuid()))
    .bind(project.offer_id.map(|id| *id.as_uuid()))
    .bind(project.start_date.as_ref().map(|t| *t.as_datetime()))
    .bind(project.end_date.as_ref().map(|t| *t.as_datetime()))
    .bind(project.created_at.as_datetime())
    .bind(project.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to insert project", e))?;
    Ok(())
}

/// Writes every column except value, cost and the detailed-budget flag.
/// Callers classify health against the locked row's value first.
async fn update_project(conn: &mut PgConnection, project: &Project) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE projects SET
            name = $2, customer_id = $3, customer_name = $4, company_id = $5, phase = $6,
            spent = $7, completion_percent = $8, health = $9, manager_id = $10,
            created_by = $11, description = $12, deal_id = $13, offer_id = $14,
            start_date = $15, end_date = $16, created_at = $17, updated_at = $18
        WHERE id = $1
        "#,
    )
    .bind(project.id.as_uuid())
    .bind(&project.name)
    .bind(project.customer_id.map(|id| *id.as_uuid()))
    .bind(&project.customer_name)
    .bind(project.company_id.as_str())
    .bind(project.phase.as_str())
    .bind(project.spent)
    .bind(project.completion_percent)
    .bind(project.health.as_str())
    .bind(project.manager_id.as_ref().map(|u| u.as_str()))
    .bind(project.created_by.as_str())
    .bind(&project.description)
    .bind(project.deal_id.map(|id| *id.as_uuid()))
    .bind(project.offer_id.map(|id| *id.as_uuid()))
    .bind(project.start_date.as_ref().map(|t| *t.as_datetime()))
    .bind(project.end_date.as_ref().map(|t| *t.as_datetime()))
    .bind(project.created_at.as_datetime())
    .bind(project.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to update project", e))?;
    ensure_affected(result, ErrorCode::ProjectNotFound, "project", project.id)
}

async fn write_project_budget(conn: &mut PgConnection, project: &Project) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE projects SET
            value = $2, cost = $3, health = $4, has_detailed_budget = $5, updated_at = $6
        WHERE id = $1
        "#,
    )
    .bind(project.id.as_uuid())
    .bind(project.value)
    .bind(project.cost)
    .bind(project.health.as_str())
    .bind(project.has_detailed_budget)
    .bind(project.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to write project totals", e))?;
    ensure_affected(result, ErrorCode::ProjectNotFound, "project", project.id)
}

async fn insert_line(conn: &mut PgConnection, line: &BudgetLine) -> Result<(), DomainError> {
    sqlx::query(&format!(
        "INSERT INTO budget_lines ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, \
         $12, $13, $14, $15)",
        LINE_COLUMNS
    ))
    .bind(line.id.as_uuid())
    .bind(line.parent.kind().as_str())
    .bind(line.parent.id())
    .bind(line.name.category_id().map(|id| *id.as_uuid()))
    .bind(line.name.as_str())
    .bind(&line.details.description)
    .bind(line.details.quantity)
    .bind(&line.details.unit)
    .bind(line.cost)
    .bind(line.revenue)
    .bind(line.margin_override)
    .bind(line.target_margin_percent)
    .bind(line.display_order as i32)
    .bind(line.created_at.as_datetime())
    .bind(line.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to insert budget line", e))?;
    Ok(())
}

async fn update_line(conn: &mut PgConnection, line: &BudgetLine) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE budget_lines SET
            category_id = $2, name = $3, description = $4, quantity = $5, unit = $6,
            cost = $7, revenue = $8, margin_override = $9, target_margin_percent = $10,
            display_order = $11, updated_at = $12
        WHERE id = $1
        "#,
    )
    .bind(line.id.as_uuid())
    .bind(line.name.category_id().map(|id| *id.as_uuid()))
    .bind(line.name.as_str())
    .bind(&line.details.description)
    .bind(line.details.quantity)
    .bind(&line.details.unit)
    .bind(line.cost)
    .bind(line.revenue)
    .bind(line.margin_override)
    .bind(line.target_margin_percent)
    .bind(line.display_order as i32)
    .bind(line.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to update budget line", e))?;
    ensure_affected(result, ErrorCode::BudgetLineNotFound, "budget line", line.id)
}
