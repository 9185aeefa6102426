//! UpdateDealHandler - Command handler for editing an open deal.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::deal::{Deal, DealPatch};
use crate::domain::foundation::{CommandMetadata, DealId};
use crate::ports::{ActivityRecorder, Change, ChangeSet, DealReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_deal, record_activity};

#[derive(Debug, Clone)]
pub struct UpdateDealCommand {
    pub deal_id: DealId,
    pub patch: DealPatch,
}

pub struct UpdateDealHandler {
    deals: Arc<dyn DealReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl UpdateDealHandler {
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
        cmd: UpdateDealCommand,
        metadata: CommandMetadata,
    ) -> Result<Deal, CommandError> {
        // 1. Load and authorize
        let mut deal = load_deal(self.deals.as_ref(), cmd.deal_id).await?;
        ensure_can_modify(&metadata.caller, &deal)?;

        // 2. Apply the edit; closed deals refuse
        deal.update(cmd.patch)?;

        // 3. Persist
        self.uow
            .commit(ChangeSet::new().with(Change::UpdateDeal(deal.clone())))
            .await?;
        debug!(deal_id = %deal.id, "deal updated");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                deal.id,
                "Deal updated",
                format!("Deal '{}' was updated", deal.title),
                &metadata.caller,
            ),
        )
        .await;

        Ok(deal)
    }
}
