//! HTTP adapter for offer endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AcceptOfferRequest, AcceptOfferResponse, AdvanceOfferRequest, CloneOfferRequest,
    CloneOfferResponse, CreateOfferRequest, RejectOfferRequest, UpdateOfferRequest,
};
pub use handlers::OfferHandlers;
pub use routes::offer_routes;
