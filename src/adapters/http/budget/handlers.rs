//! HTTP handlers for budget line endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::caller::CurrentCaller;
use crate::adapters::http::error::{parse_id, ApiError};
use crate::application::handlers::budget::{
    CloneBudgetLinesCommand, CloneBudgetLinesHandler, CreateBudgetLineCommand,
    CreateBudgetLineHandler, DeleteBudgetLineCommand, DeleteBudgetLineHandler,
    DeleteBudgetLinesByParentCommand, DeleteBudgetLinesByParentHandler, GetBudgetSummaryHandler,
    GetBudgetSummaryQuery, ListBudgetLinesHandler, ListBudgetLinesPageQuery, ListBudgetLinesQuery,
    ReorderBudgetLinesCommand, ReorderBudgetLinesHandler, UpdateBudgetLineCommand,
    UpdateBudgetLineHandler,
};
use crate::domain::budget::{BudgetParent, BudgetParentKind, LineDetails};
use crate::domain::foundation::BudgetLineId;
use crate::ports::DEFAULT_PAGE_SIZE;

use super::dto::{
    CloneRequest, CloneResponse, CreateBudgetLineRequest, DeletedResponse, LineWithSummaryResponse,
    ListLinesQuery, ReorderRequest, UpdateBudgetLineRequest,
};

#[derive(Clone)]
pub struct BudgetHandlers {
    pub create: Arc<CreateBudgetLineHandler>,
    pub update: Arc<UpdateBudgetLineHandler>,
    pub delete: Arc<DeleteBudgetLineHandler>,
    pub delete_by_parent: Arc<DeleteBudgetLinesByParentHandler>,
    pub reorder: Arc<ReorderBudgetLinesHandler>,
    pub clone_lines: Arc<CloneBudgetLinesHandler>,
    pub list: Arc<ListBudgetLinesHandler>,
    pub summary: Arc<GetBudgetSummaryHandler>,
}

/// Parses `/:parent_type/:parent_id`, e.g. `offer/5b0c...`.
fn parent_from_path(parent_type: &str, parent_id: &str) -> Result<BudgetParent, ApiError> {
    let kind: BudgetParentKind = parent_type
        .parse()
        .map_err(|_| ApiError::bad_request(format!("unknown budget parent: {}", parent_type)))?;
    let id = parse_id(parent_id, kind.as_str())?;
    Ok(BudgetParent::from_parts(kind, id))
}

/// POST /api/budgets/:parent_type/:parent_id/lines
pub async fn create_line(
    State(handlers): State<BudgetHandlers>,
    caller: CurrentCaller,
    Path((parent_type, parent_id)): Path<(String, String)>,
    Json(req): Json<CreateBudgetLineRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = parent_from_path(&parent_type, &parent_id)?;
    let cmd = CreateBudgetLineCommand {
        parent,
        category_id: req.category_id,
        custom_name: req.name,
        details: LineDetails {
            description: req.description,
            quantity: req.quantity,
            unit: req.unit,
        },
        cost: req.cost,
        revenue: req.revenue,
        margin_override: req.margin_override,
        target_margin_percent: req.target_margin_percent,
        display_order: req.display_order,
    };
    let result = handlers.create.handle(cmd, caller.metadata()).await?;
    Ok((
        StatusCode::CREATED,
        Json(LineWithSummaryResponse {
            line: result.line,
            summary: result.summary,
        }),
    ))
}

/// GET /api/budgets/:parent_type/:parent_id/lines[?page=&page_size=]
pub async fn list_lines(
    State(handlers): State<BudgetHandlers>,
    _caller: CurrentCaller,
    Path((parent_type, parent_id)): Path<(String, String)>,
    Query(query): Query<ListLinesQuery>,
) -> Result<Response, ApiError> {
    let parent = parent_from_path(&parent_type, &parent_id)?;
    if query.page.is_none() && query.page_size.is_none() {
        let lines = handlers.list.handle(ListBudgetLinesQuery { parent }).await?;
        return Ok(Json(lines).into_response());
    }

    let page = handlers
        .list
        .handle_page(ListBudgetLinesPageQuery {
            parent,
            page: query.page.unwrap_or(1),
            page_size: query.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
        })
        .await?;
    Ok(Json(page).into_response())
}

/// DELETE /api/budgets/:parent_type/:parent_id/lines
pub async fn delete_lines_by_parent(
    State(handlers): State<BudgetHandlers>,
    caller: CurrentCaller,
    Path((parent_type, parent_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = parent_from_path(&parent_type, &parent_id)?;
    let result = handlers
        .delete_by_parent
        .handle(DeleteBudgetLinesByParentCommand { parent }, caller.metadata())
        .await?;
    Ok(Json(DeletedResponse {
        deleted: result.deleted,
    }))
}

/// GET /api/budgets/:parent_type/:parent_id/summary
pub async fn get_summary(
    State(handlers): State<BudgetHandlers>,
    _caller: CurrentCaller,
    Path((parent_type, parent_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = parent_from_path(&parent_type, &parent_id)?;
    let summary = handlers
        .summary
        .handle(GetBudgetSummaryQuery { parent })
        .await?;
    Ok(Json(summary))
}

/// PUT /api/budgets/:parent_type/:parent_id/order
pub async fn reorder_lines(
    State(handlers): State<BudgetHandlers>,
    caller: CurrentCaller,
    Path((parent_type, parent_id)): Path<(String, String)>,
    Json(req): Json<ReorderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = parent_from_path(&parent_type, &parent_id)?;
    handlers
        .reorder
        .handle(
            ReorderBudgetLinesCommand {
                parent,
                ordered_ids: req.ordered_ids,
            },
            caller.metadata(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/budgets/:parent_type/:parent_id/clone
///
/// The path names the target; the body names the source.
pub async fn clone_lines(
    State(handlers): State<BudgetHandlers>,
    caller: CurrentCaller,
    Path((parent_type, parent_id)): Path<(String, String)>,
    Json(req): Json<CloneRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let target = parent_from_path(&parent_type, &parent_id)?;
    let source = BudgetParent::from_parts(req.source_type, req.source_id);
    let result = handlers
        .clone_lines
        .handle(CloneBudgetLinesCommand { source, target }, caller.metadata())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CloneResponse {
            lines: result.lines,
            summary: result.target_summary,
        }),
    ))
}

/// PATCH /api/budget-lines/:id
pub async fn update_line(
    State(handlers): State<BudgetHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<UpdateBudgetLineRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let line_id: BudgetLineId = parse_id(&id, "budget line")?;
    let cmd = UpdateBudgetLineCommand {
        line_id,
        category_id: req.category_id,
        custom_name: req.name,
        description: req.description,
        quantity: req.quantity,
        unit: req.unit,
        cost: req.cost,
        revenue: req.revenue,
        margin_override: req.margin_override,
        target_margin_percent: req.target_margin_percent,
    };
    let result = handlers.update.handle(cmd, caller.metadata()).await?;
    Ok(Json(LineWithSummaryResponse {
        line: result.line,
        summary: result.summary,
    }))
}

/// DELETE /api/budget-lines/:id
pub async fn delete_line(
    State(handlers): State<BudgetHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let line_id: BudgetLineId = parse_id(&id, "budget line")?;
    let result = handlers
        .delete
        .handle(DeleteBudgetLineCommand { line_id }, caller.metadata())
        .await?;
    Ok(Json(result.summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parent_from_path_segments() {
        let id = uuid::Uuid::new_v4();
        let parent = parent_from_path("project", &id.to_string()).unwrap();
        assert_eq!(parent.kind(), BudgetParentKind::Project);
        assert_eq!(parent.id(), id);
    }

    #[test]
    fn rejects_unknown_parent_type() {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(matches!(
            parent_from_path("deal", &id),
            Err(ApiError::BadRequest(_))
        ));
    }
}
