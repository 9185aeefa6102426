//! GetOfferHandler - Query handler for a single offer.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::foundation::OfferId;
use crate::domain::offer::Offer;
use crate::ports::OfferReader;

use super::super::support::load_offer;

#[derive(Debug, Clone)]
pub struct GetOfferQuery {
    pub offer_id: OfferId,
}

pub struct GetOfferHandler {
    offers: Arc<dyn OfferReader>,
}

impl GetOfferHandler {
    pub fn new(offers: Arc<dyn OfferReader>) -> Self {
        Self { offers }
    }

    pub async fn handle(&self, query: GetOfferQuery) -> Result<Offer, CommandError> {
        load_offer(self.offers.as_ref(), query.offer_id).await
    }
}
