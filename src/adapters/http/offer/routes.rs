//! HTTP routes for offer endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    accept_offer, advance_offer, clone_offer, create_offer, expire_offer, get_offer,
    recalculate_offer, reject_offer, send_offer, update_offer, OfferHandlers,
};

/// Creates the offer router, mounted under `/api/offers`.
pub fn offer_routes(handlers: OfferHandlers) -> Router {
    Router::new()
        .route("/", post(create_offer))
        .route("/:id", get(get_offer).patch(update_offer))
        .route("/:id/send", post(send_offer))
        .route("/:id/accept", post(accept_offer))
        .route("/:id/reject", post(reject_offer))
        .route("/:id/expire", post(expire_offer))
        .route("/:id/clone", post(clone_offer))
        .route("/:id/advance", post(advance_offer))
        .route("/:id/recalculate", post(recalculate_offer))
        .with_state(handlers)
}
