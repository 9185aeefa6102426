//! AdvanceOfferHandler - Command handler for generic moves between open phases.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::{Offer, OfferPhase};
use crate::ports::{ActivityRecorder, Change, ChangeSet, NumberSequence, OfferReader, UnitOfWork};

use super::super::support::{ensure_can_modify, issue_offer_number, load_offer, record_activity};

#[derive(Debug, Clone)]
pub struct AdvanceOfferCommand {
    pub offer_id: OfferId,
    pub target: OfferPhase,
}

/// Handler for phase updates that are not accept, reject or expire.
///
/// Leaving draft issues a number; returning to draft clears it.
pub struct AdvanceOfferHandler {
    offers: Arc<dyn OfferReader>,
    uow: Arc<dyn UnitOfWork>,
    sequence: Arc<dyn NumberSequence>,
    activities: Arc<dyn ActivityRecorder>,
    validity_days: i64,
}

impl AdvanceOfferHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        uow: Arc<dyn UnitOfWork>,
        sequence: Arc<dyn NumberSequence>,
        activities: Arc<dyn ActivityRecorder>,
        validity_days: i64,
    ) -> Self {
        Self {
            offers,
            uow,
            sequence,
            activities,
            validity_days,
        }
    }

    pub async fn handle(
        &self,
        cmd: AdvanceOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<Offer, CommandError> {
        // 1. Load and authorize
        let mut offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_modify(&metadata.caller, &offer)?;

        // 2. Validate first so a rejected move never consumes a number
        let from = offer.phase;
        offer.ensure_can_advance(cmd.target)?;
        if from == cmd.target {
            return Ok(offer);
        }

        // 3. Transition
        let issued = if offer.needs_number_for(cmd.target) {
            Some(issue_offer_number(self.sequence.as_ref(), &offer.company_id).await?)
        } else {
            None
        };
        offer.advance(cmd.target, issued, self.validity_days)?;

        self.uow
            .commit(ChangeSet::new().with(Change::UpdateOffer(offer.clone())))
            .await?;
        debug!(offer_id = %offer.id, from = %from, to = %offer.phase, "offer phase changed");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                offer.id,
                "Offer phase changed",
                format!("Offer '{}' moved from {} to {}", offer.title, from, offer.phase),
                &metadata.caller,
            ),
        )
        .await;

        Ok(offer)
    }
}
