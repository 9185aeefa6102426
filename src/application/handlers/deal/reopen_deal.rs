//! ReopenDealHandler - Command handler for reviving a lost deal.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::deal::{Deal, StageHistoryEntry};
use crate::domain::foundation::{CommandMetadata, DealId};
use crate::ports::{ActivityRecorder, Change, ChangeSet, DealReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_deal, record_activity};

#[derive(Debug, Clone)]
pub struct ReopenDealCommand {
    pub deal_id: DealId,
}

#[derive(Debug, Clone)]
pub struct ReopenDealResult {
    pub deal: Deal,
    pub history: StageHistoryEntry,
}

pub struct ReopenDealHandler {
    deals: Arc<dyn DealReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl ReopenDealHandler {
    pub fn new(
        deals: Arc<dyn DealReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            deals,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReopenDealCommand,
        metadata: CommandMetadata,
    ) -> Result<ReopenDealResult, CommandError> {
        let mut deal = load_deal(self.deals.as_ref(), cmd.deal_id).await?;
        ensure_can_modify(&metadata.caller, &deal)?;

        let history = deal.reopen(&metadata.caller)?;
        self.uow
            .commit(
                ChangeSet::new()
                    .with(Change::UpdateDeal(deal.clone()))
                    .with(Change::AppendStageHistory(history.clone())),
            )
            .await?;
        debug!(deal_id = %deal.id, "deal reopened");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                deal.id,
                "Deal reopened",
                format!("Deal '{}' was reopened as a new lead", deal.title),
                &metadata.caller,
            ),
        )
        .await;

        Ok(ReopenDealResult { deal, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, Fixture};
    use crate::domain::deal::DealStage;
    use crate::domain::foundation::ErrorCode;

    fn handler(f: &Fixture) -> ReopenDealHandler {
        ReopenDealHandler::new(f.store.clone(), f.store.clone(), f.activities.clone())
    }

    #[tokio::test]
    async fn lost_deal_returns_to_lead() {
        let f = Fixture::new();
        let mut deal = f.deal(DealStage::Lost);
        deal.lost_reason = Some("too expensive".to_string());
        f.store.seed_deal(deal.clone());

        let result = handler(&f)
            .handle(ReopenDealCommand { deal_id: deal.id }, metadata(owner()))
            .await
            .unwrap();

        assert_eq!(result.deal.stage, DealStage::Lead);
        assert_eq!(result.deal.probability, 10);
        assert_eq!(result.history.from_stage, Some(DealStage::Lost));
        let stored = f.store.deal(&deal.id).unwrap();
        assert_eq!(stored.lost_reason, None);
        assert_eq!(stored.actual_close_date, None);
    }

    #[tokio::test]
    async fn open_deal_cannot_be_reopened() {
        let f = Fixture::new();
        let deal = f.deal(DealStage::Qualified);

        let err = handler(&f)
            .handle(ReopenDealCommand { deal_id: deal.id }, metadata(owner()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DealNotLost);
    }
}
