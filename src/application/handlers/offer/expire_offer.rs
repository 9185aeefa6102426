//! ExpireOfferHandler - Command handler for marking an offer as expired.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::{Offer, OfferError, OfferPhase};
use crate::ports::{ActivityRecorder, Change, ChangeSet, NumberSequence, OfferReader, UnitOfWork};

use super::super::support::{ensure_can_modify, issue_offer_number, load_offer, record_activity};

#[derive(Debug, Clone)]
pub struct ExpireOfferCommand {
    pub offer_id: OfferId,
}

/// Handler for expiring any open offer. A draft receives its number here.
pub struct ExpireOfferHandler {
    offers: Arc<dyn OfferReader>,
    uow: Arc<dyn UnitOfWork>,
    sequence: Arc<dyn NumberSequence>,
    activities: Arc<dyn ActivityRecorder>,
}

impl ExpireOfferHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        uow: Arc<dyn UnitOfWork>,
        sequence: Arc<dyn NumberSequence>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            offers,
            uow,
            sequence,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: ExpireOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<Offer, CommandError> {
        let mut offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_modify(&metadata.caller, &offer)?;
        if offer.phase.is_closed() {
            return Err(OfferError::AlreadyClosed.into());
        }

        let issued = if offer.needs_number_for(OfferPhase::Expired) {
            Some(issue_offer_number(self.sequence.as_ref(), &offer.company_id).await?)
        } else {
            None
        };
        let from = offer.phase;
        offer.expire(issued)?;

        self.uow
            .commit(ChangeSet::new().with(Change::UpdateOffer(offer.clone())))
            .await?;
        debug!(offer_id = %offer.id, "offer expired");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                offer.id,
                "Offer expired",
                format!(
                    "Offer '{}' was marked as expired (phase: {} -> {})",
                    offer.title, from, offer.phase
                ),
                &metadata.caller,
            ),
        )
        .await;

        Ok(offer)
    }
}
