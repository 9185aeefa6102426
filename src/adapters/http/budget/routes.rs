//! HTTP routes for budget line endpoints.

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use super::handlers::{
    clone_lines, create_line, delete_line, delete_lines_by_parent, get_summary, list_lines,
    reorder_lines, update_line, BudgetHandlers,
};

/// Creates the per-parent budget router, mounted under `/api/budgets`.
pub fn budget_routes(handlers: BudgetHandlers) -> Router {
    Router::new()
        .route(
            "/:parent_type/:parent_id/lines",
            get(list_lines)
                .post(create_line)
                .delete(delete_lines_by_parent),
        )
        .route("/:parent_type/:parent_id/summary", get(get_summary))
        .route("/:parent_type/:parent_id/order", put(reorder_lines))
        .route("/:parent_type/:parent_id/clone", post(clone_lines))
        .with_state(handlers)
}

/// Creates the single-line router, mounted under `/api/budget-lines`.
pub fn budget_line_routes(handlers: BudgetHandlers) -> Router {
    Router::new()
        .route("/:id", patch(update_line).delete(delete_line))
        .with_state(handlers)
}
