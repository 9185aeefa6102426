//! GetStageHistoryHandler - Query handler for a deal's stage log.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::deal::StageHistoryEntry;
use crate::domain::foundation::DealId;
use crate::ports::{DealReader, StageHistoryReader};

use super::super::support::load_deal;

#[derive(Debug, Clone)]
pub struct GetStageHistoryQuery {
    pub deal_id: DealId,
}

/// Returns the stage history of a deal, most recent first.
pub struct GetStageHistoryHandler {
    deals: Arc<dyn DealReader>,
    history: Arc<dyn StageHistoryReader>,
}

impl GetStageHistoryHandler {
    pub fn new(deals: Arc<dyn DealReader>, history: Arc<dyn StageHistoryReader>) -> Self {
        Self { deals, history }
    }

    pub async fn handle(
        &self,
        query: GetStageHistoryQuery,
    ) -> Result<Vec<StageHistoryEntry>, CommandError> {
        load_deal(self.deals.as_ref(), query.deal_id).await?;
        Ok(self.history.list_for_deal(&query.deal_id).await?)
    }
}
