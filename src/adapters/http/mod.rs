//! HTTP adapter: the REST surface over the command and query handlers.
//!
//! ```text
//! /api/deals            deal lifecycle
//! /api/offers           offer lifecycle and numbering
//! /api/projects         project phase, completion, spend, health
//! /api/budgets/:type/:id budget lines of an offer or project
//! /api/budget-lines/:id single line edits
//! /health               liveness
//! ```

pub mod budget;
pub mod deal;
pub mod offer;
pub mod project;

mod caller;
mod error;

pub use caller::CurrentCaller;
pub use error::{ApiError, ErrorResponse};

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::application::handlers::budget::{
    CloneBudgetLinesHandler, CreateBudgetLineHandler, DeleteBudgetLineHandler,
    DeleteBudgetLinesByParentHandler, GetBudgetSummaryHandler, ListBudgetLinesHandler,
    ReorderBudgetLinesHandler, UpdateBudgetLineHandler,
};
use crate::application::handlers::deal::{
    AdvanceDealStageHandler, CreateDealHandler, CreateOfferFromDealHandler, GetDealHandler,
    GetStageHistoryHandler, LoseDealHandler, ReopenDealHandler, UpdateDealHandler, WinDealHandler,
};
use crate::application::handlers::offer::{
    AcceptOfferHandler, AdvanceOfferHandler, CloneOfferHandler, CreateOfferHandler,
    ExpireOfferHandler, GetOfferHandler, RecalculateOfferTotalsHandler, RejectOfferHandler,
    SendOfferHandler, UpdateOfferHandler,
};
use crate::application::handlers::project::{
    CreateProjectHandler, GetProjectHandler, InheritProjectBudgetHandler,
    RecalculateProjectHealthHandler, RecordProjectSpendHandler, UpdateProjectCompletionHandler,
    UpdateProjectPhaseHandler,
};
use crate::config::PipelineConfig;
use crate::ports::{
    ActivityRecorder, BudgetCategoryReader, BudgetLineReader, DealReader, NotificationSink,
    NumberSequence, OfferReader, ProjectReader, StageHistoryReader, UnitOfWork,
};

use budget::{budget_line_routes, budget_routes, BudgetHandlers};
use deal::{deal_routes, DealHandlers};
use offer::{offer_routes, OfferHandlers};
use project::{project_routes, ProjectHandlers};

/// A storage backend serving every read port, the number sequence and the
/// unit of work.
pub trait Store:
    DealReader
    + StageHistoryReader
    + OfferReader
    + ProjectReader
    + BudgetLineReader
    + BudgetCategoryReader
    + NumberSequence
    + UnitOfWork
    + 'static
{
}

impl<T> Store for T where
    T: DealReader
        + StageHistoryReader
        + OfferReader
        + ProjectReader
        + BudgetLineReader
        + BudgetCategoryReader
        + NumberSequence
        + UnitOfWork
        + 'static
{
}

/// Every handler bundle the router needs.
#[derive(Clone)]
pub struct ApiHandlers {
    pub deals: DealHandlers,
    pub offers: OfferHandlers,
    pub projects: ProjectHandlers,
    pub budget: BudgetHandlers,
}

impl ApiHandlers {
    /// Wires all handlers against one store and the two side-effect sinks.
    pub fn new<S: Store>(
        store: Arc<S>,
        activities: Arc<dyn ActivityRecorder>,
        notifications: Arc<dyn NotificationSink>,
        pipeline: &PipelineConfig,
    ) -> Self {
        let deals: Arc<dyn DealReader> = store.clone();
        let history: Arc<dyn StageHistoryReader> = store.clone();
        let offers: Arc<dyn OfferReader> = store.clone();
        let projects: Arc<dyn ProjectReader> = store.clone();
        let lines: Arc<dyn BudgetLineReader> = store.clone();
        let categories: Arc<dyn BudgetCategoryReader> = store.clone();
        let sequence: Arc<dyn NumberSequence> = store.clone();
        let uow: Arc<dyn UnitOfWork> = store;
        let validity_days = pipeline.offer_validity_days;

        let deal_handlers = DealHandlers {
            create: Arc::new(CreateDealHandler::new(
                uow.clone(),
                activities.clone(),
                pipeline.default_currency.clone(),
            )),
            get: Arc::new(GetDealHandler::new(deals.clone())),
            update: Arc::new(UpdateDealHandler::new(
                deals.clone(),
                uow.clone(),
                activities.clone(),
            )),
            advance: Arc::new(AdvanceDealStageHandler::new(
                deals.clone(),
                uow.clone(),
                activities.clone(),
                notifications.clone(),
            )),
            win: Arc::new(WinDealHandler::new(
                deals.clone(),
                offers.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
                notifications.clone(),
            )),
            lose: Arc::new(LoseDealHandler::new(
                deals.clone(),
                uow.clone(),
                activities.clone(),
                notifications.clone(),
            )),
            reopen: Arc::new(ReopenDealHandler::new(
                deals.clone(),
                uow.clone(),
                activities.clone(),
            )),
            create_offer: Arc::new(CreateOfferFromDealHandler::new(
                deals.clone(),
                offers.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
            )),
            history: Arc::new(GetStageHistoryHandler::new(deals, history)),
        };

        let offer_handlers = OfferHandlers {
            create: Arc::new(CreateOfferHandler::new(
                uow.clone(),
                sequence.clone(),
                activities.clone(),
            )),
            get: Arc::new(GetOfferHandler::new(offers.clone())),
            update: Arc::new(UpdateOfferHandler::new(
                offers.clone(),
                uow.clone(),
                activities.clone(),
            )),
            send: Arc::new(SendOfferHandler::new(
                offers.clone(),
                uow.clone(),
                sequence.clone(),
                activities.clone(),
                notifications.clone(),
                validity_days,
            )),
            accept: Arc::new(AcceptOfferHandler::new(
                offers.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
                notifications.clone(),
            )),
            reject: Arc::new(RejectOfferHandler::new(
                offers.clone(),
                uow.clone(),
                activities.clone(),
                notifications,
            )),
            expire: Arc::new(ExpireOfferHandler::new(
                offers.clone(),
                uow.clone(),
                sequence.clone(),
                activities.clone(),
            )),
            clone_offer: Arc::new(CloneOfferHandler::new(
                offers.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
            )),
            advance: Arc::new(AdvanceOfferHandler::new(
                offers.clone(),
                uow.clone(),
                sequence,
                activities.clone(),
                validity_days,
            )),
            recalculate: Arc::new(RecalculateOfferTotalsHandler::new(
                offers.clone(),
                uow.clone(),
            )),
        };

        let project_handlers = ProjectHandlers {
            create: Arc::new(CreateProjectHandler::new(uow.clone(), activities.clone())),
            get: Arc::new(GetProjectHandler::new(projects.clone())),
            phase: Arc::new(UpdateProjectPhaseHandler::new(
                projects.clone(),
                uow.clone(),
                activities.clone(),
            )),
            completion: Arc::new(UpdateProjectCompletionHandler::new(
                projects.clone(),
                uow.clone(),
                activities.clone(),
            )),
            spend: Arc::new(RecordProjectSpendHandler::new(
                projects.clone(),
                uow.clone(),
                activities.clone(),
            )),
            inherit: Arc::new(InheritProjectBudgetHandler::new(
                projects.clone(),
                offers.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
            )),
            health: Arc::new(RecalculateProjectHealthHandler::new(
                projects.clone(),
                uow.clone(),
            )),
        };

        let budget_handlers = BudgetHandlers {
            create: Arc::new(CreateBudgetLineHandler::new(
                offers.clone(),
                projects.clone(),
                lines.clone(),
                categories.clone(),
                uow.clone(),
                activities.clone(),
            )),
            update: Arc::new(UpdateBudgetLineHandler::new(
                offers.clone(),
                projects.clone(),
                lines.clone(),
                categories,
                uow.clone(),
                activities.clone(),
            )),
            delete: Arc::new(DeleteBudgetLineHandler::new(
                offers.clone(),
                projects.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
            )),
            delete_by_parent: Arc::new(DeleteBudgetLinesByParentHandler::new(
                offers.clone(),
                projects.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
            )),
            reorder: Arc::new(ReorderBudgetLinesHandler::new(
                offers.clone(),
                projects.clone(),
                lines.clone(),
                uow.clone(),
                activities.clone(),
            )),
            clone_lines: Arc::new(CloneBudgetLinesHandler::new(
                offers.clone(),
                projects.clone(),
                lines.clone(),
                uow,
                activities,
            )),
            list: Arc::new(ListBudgetLinesHandler::new(
                offers.clone(),
                projects.clone(),
                lines.clone(),
            )),
            summary: Arc::new(GetBudgetSummaryHandler::new(offers, projects, lines)),
        };

        Self {
            deals: deal_handlers,
            offers: offer_handlers,
            projects: project_handlers,
            budget: budget_handlers,
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the full application router.
pub fn api_router(handlers: ApiHandlers, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/deals", deal_routes(handlers.deals))
        .nest("/api/offers", offer_routes(handlers.offers))
        .nest("/api/projects", project_routes(handlers.projects))
        .nest("/api/budgets", budget_routes(handlers.budget.clone()))
        .nest("/api/budget-lines", budget_line_routes(handlers.budget))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
