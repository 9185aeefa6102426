//! HTTP adapter for deal endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AdvanceDealRequest, CreateDealRequest, CreateOfferFromDealRequest, DealTransitionResponse,
    LoseDealRequest, OfferFromDealResponse, UpdateDealRequest, WinDealRequest, WinDealResponse,
};
pub use handlers::DealHandlers;
pub use routes::deal_routes;
