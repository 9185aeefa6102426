//! LoseDealHandler - Command handler for closing a deal as lost.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::{ActivityEntry, Notification, NotificationKind};
use crate::domain::deal::{Deal, LossReasonCategory, StageHistoryEntry};
use crate::domain::foundation::{CommandMetadata, DealId};
use crate::ports::{ActivityRecorder, Change, ChangeSet, DealReader, NotificationSink, UnitOfWork};

use super::super::support::{ensure_can_modify, load_deal, record_activity, send_notification};

#[derive(Debug, Clone)]
pub struct LoseDealCommand {
    pub deal_id: DealId,
    pub category: LossReasonCategory,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct LoseDealResult {
    pub deal: Deal,
    pub history: StageHistoryEntry,
}

pub struct LoseDealHandler {
    deals: Arc<dyn DealReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
    notifications: Arc<dyn NotificationSink>,
}

impl LoseDealHandler {
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
        cmd: LoseDealCommand,
        metadata: CommandMetadata,
    ) -> Result<LoseDealResult, CommandError> {
        let caller = &metadata.caller;

        // 1. Load and authorize
        let mut deal = load_deal(self.deals.as_ref(), cmd.deal_id).await?;
        ensure_can_modify(caller, &deal)?;

        // 2. Close; a second call fails instead of overwriting the reason
        let history = deal.lose(cmd.category, cmd.notes.clone(), caller)?;
        debug!(deal_id = %deal.id, category = %cmd.category, "deal lost");

        // 3. Persist
        self.uow
            .commit(
                ChangeSet::new()
                    .with(Change::UpdateDeal(deal.clone()))
                    .with(Change::AppendStageHistory(history.clone())),
            )
            .await?;

        // 4. Side effects
        let message = format!(
            "Deal '{}' was lost. Category: {}. Details: {}",
            deal.title, cmd.category, cmd.notes
        );
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(deal.id, "Deal lost", message.clone(), caller),
        )
        .await;
        if deal.owner_id != caller.user_id {
            send_notification(
                self.notifications.as_ref(),
                Notification::new(
                    deal.owner_id.clone(),
                    NotificationKind::DealLost,
                    "Deal lost",
                    message,
                    deal.id,
                ),
            )
            .await;
        }

        Ok(LoseDealResult { deal, history })
    }
}
