//! Offer reader port.

use crate::domain::foundation::{DomainError, OfferId};
use crate::domain::offer::Offer;
use async_trait::async_trait;

/// Reader port for offers.
#[async_trait]
pub trait OfferReader: Send + Sync {
    /// Find an offer by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, DomainError>;
}
