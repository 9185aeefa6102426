//! RejectOfferHandler - Command handler for a customer declining an offer.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::{ActivityEntry, NotificationKind};
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::Offer;
use crate::ports::{ActivityRecorder, Change, ChangeSet, NotificationSink, OfferReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_offer, record_activity};
use super::notify_responsible;

#[derive(Debug, Clone)]
pub struct RejectOfferCommand {
    pub offer_id: OfferId,
    /// Appended to the offer notes as `Lost reason: ...`.
    pub reason: Option<String>,
}

pub struct RejectOfferHandler {
    offers: Arc<dyn OfferReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
    notifications: Arc<dyn NotificationSink>,
}

impl RejectOfferHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            offers,
            uow,
            activities,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        cmd: RejectOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<Offer, CommandError> {
        let caller = &metadata.caller;

        let mut offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_modify(caller, &offer)?;

        let from = offer.phase;
        offer.reject(cmd.reason.clone())?;
        self.uow
            .commit(ChangeSet::new().with(Change::UpdateOffer(offer.clone())))
            .await?;
        debug!(offer_id = %offer.id, "offer rejected");

        let mut message = format!(
            "Offer '{}' was rejected (phase: {} -> {})",
            offer.title, from, offer.phase
        );
        if let Some(reason) = cmd.reason.filter(|r| !r.trim().is_empty()) {
            message = format!("{}. Reason: {}", message, reason.trim());
        }
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(offer.id, "Offer rejected", message.clone(), caller),
        )
        .await;
        notify_responsible(
            self.notifications.as_ref(),
            &offer,
            caller,
            NotificationKind::OfferRejected,
            "Offer rejected",
            message,
        )
        .await;

        Ok(offer)
    }
}
