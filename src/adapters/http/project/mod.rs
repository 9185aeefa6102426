//! HTTP adapter for project endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CompletionResponse, CreateProjectRequest, InheritBudgetRequest, InheritBudgetResponse,
    RecordSpendRequest, UpdateCompletionRequest, UpdatePhaseRequest,
};
pub use handlers::ProjectHandlers;
pub use routes::project_routes;
