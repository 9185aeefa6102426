//! Offer domain - quotes, their phase lifecycle and numbering.

mod aggregate;
mod errors;
mod number;
mod phase;

pub use aggregate::{NewOffer, Offer, OfferPatch};
pub use errors::OfferError;
pub use number::OfferNumber;
pub use phase::OfferPhase;
