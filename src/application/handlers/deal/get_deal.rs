//! GetDealHandler - Query handler for a single deal.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::deal::Deal;
use crate::domain::foundation::DealId;
use crate::ports::DealReader;

use super::super::support::load_deal;

#[derive(Debug, Clone)]
pub struct GetDealQuery {
    pub deal_id: DealId,
}

pub struct GetDealHandler {
    deals: Arc<dyn DealReader>,
}

impl GetDealHandler {
    pub fn new(deals: Arc<dyn DealReader>) -> Self {
        Self { deals }
    }

    pub async fn handle(&self, query: GetDealQuery) -> Result<Deal, CommandError> {
        load_deal(self.deals.as_ref(), query.deal_id).await
    }
}
