//! UpdateOfferHandler - Command handler for editing an open offer.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::{Offer, OfferPatch};
use crate::ports::{ActivityRecorder, Change, ChangeSet, OfferReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_offer, record_activity};

#[derive(Debug, Clone)]
pub struct UpdateOfferCommand {
    pub offer_id: OfferId,
    pub patch: OfferPatch,
}

pub struct UpdateOfferHandler {
    offers: Arc<dyn OfferReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl UpdateOfferHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            offers,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<Offer, CommandError> {
        let mut offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_modify(&metadata.caller, &offer)?;

        // Closed offers and number invariant breaches are refused here
        offer.update(cmd.patch)?;

        self.uow
            .commit(ChangeSet::new().with(Change::UpdateOffer(offer.clone())))
            .await?;
        debug!(offer_id = %offer.id, "offer updated");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                offer.id,
                "Offer updated",
                format!("Offer '{}' was updated", offer.title),
                &metadata.caller,
            ),
        )
        .await;

        Ok(offer)
    }
}
