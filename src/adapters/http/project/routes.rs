//! HTTP routes for project endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    create_project, get_project, inherit_budget, recalculate_health, record_spend,
    update_completion, update_phase, ProjectHandlers,
};

/// Creates the project router, mounted under `/api/projects`.
pub fn project_routes(handlers: ProjectHandlers) -> Router {
    Router::new()
        .route("/", post(create_project))
        .route("/:id", get(get_project))
        .route("/:id/phase", put(update_phase))
        .route("/:id/completion", put(update_completion))
        .route("/:id/spend", put(record_spend))
        .route("/:id/inherit-budget", post(inherit_budget))
        .route("/:id/recalculate-health", post(recalculate_health))
        .with_state(handlers)
}
