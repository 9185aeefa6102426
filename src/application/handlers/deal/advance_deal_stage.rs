//! AdvanceDealStageHandler - Command handler for moving a deal along the pipeline.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::{ActivityEntry, Notification, NotificationKind};
use crate::domain::deal::{Deal, DealStage, StageHistoryEntry};
use crate::domain::foundation::{CommandMetadata, DealId};
use crate::ports::{ActivityRecorder, Change, ChangeSet, DealReader, NotificationSink, UnitOfWork};

use super::super::support::{ensure_can_modify, load_deal, record_activity, send_notification};

#[derive(Debug, Clone)]
pub struct AdvanceDealStageCommand {
    pub deal_id: DealId,
    pub target: DealStage,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdvanceDealStageResult {
    pub deal: Deal,
    pub history: StageHistoryEntry,
}

/// Handler for explicit stage transitions.
///
/// Only one step forward or a drop to `lost` is accepted; `won` goes
/// through [`super::WinDealHandler`].
pub struct AdvanceDealStageHandler {
    deals: Arc<dyn DealReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
    notifications: Arc<dyn NotificationSink>,
}

impl AdvanceDealStageHandler {
    pub fn new(
        deals: Arc<dyn DealReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            deals,
            uow,
            activities,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        cmd: AdvanceDealStageCommand,
        metadata: CommandMetadata,
    ) -> Result<AdvanceDealStageResult, CommandError> {
        let caller = &metadata.caller;

        // 1. Load and authorize
        let mut deal = load_deal(self.deals.as_ref(), cmd.deal_id).await?;
        ensure_can_modify(caller, &deal)?;

        // 2. Transition
        let from = deal.stage;
        let history = deal.advance_stage(cmd.target, cmd.notes, caller)?;
        debug!(deal_id = %deal.id, from = %from, to = %deal.stage, "deal stage advanced");

        // 3. Persist deal and history together
        self.uow
            .commit(
                ChangeSet::new()
                    .with(Change::UpdateDeal(deal.clone()))
                    .with(Change::AppendStageHistory(history.clone())),
            )
            .await?;

        // 4. Side effects
        let message = format!("Deal '{}' moved from {} to {}", deal.title, from, deal.stage);
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(deal.id, "Deal stage changed", message.clone(), caller),
        )
        .await;
        if deal.owner_id != caller.user_id {
            send_notification(
                self.notifications.as_ref(),
                Notification::new(
                    deal.owner_id.clone(),
                    NotificationKind::DealStageChanged,
                    "Deal stage changed",
                    message,
                    deal.id,
                ),
            )
            .await;
        }

        Ok(AdvanceDealStageResult { deal, history })
    }
}
