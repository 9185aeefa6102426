//! HTTP routes for deal endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    advance_deal, create_deal, create_offer_from_deal, get_deal, lose_deal, reopen_deal,
    stage_history, update_deal, win_deal, DealHandlers,
};

/// Creates the deal router, mounted under `/api/deals`.
pub fn deal_routes(handlers: DealHandlers) -> Router {
    Router::new()
        .route("/", post(create_deal))
        .route("/:id", get(get_deal).patch(update_deal))
        .route("/:id/advance", post(advance_deal))
        .route("/:id/win", post(win_deal))
        .route("/:id/lose", post(lose_deal))
        .route("/:id/reopen", post(reopen_deal))
        .route("/:id/offers", post(create_offer_from_deal))
        .route("/:id/history", get(stage_history))
        .with_state(handlers)
}
