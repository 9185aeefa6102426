//! HTTP adapter for budget line endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CloneRequest, CloneResponse, CreateBudgetLineRequest, DeletedResponse,
    LineWithSummaryResponse, ListLinesQuery, ReorderRequest, UpdateBudgetLineRequest,
};
pub use handlers::BudgetHandlers;
pub use routes::{budget_line_routes, budget_routes};
