//! SendOfferHandler - Command handler for sending an offer to the customer.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::{ActivityEntry, NotificationKind};
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::{Offer, OfferError, OfferPhase};
use crate::ports::{
    ActivityRecorder, Change, ChangeSet, NotificationSink, NumberSequence, OfferReader, UnitOfWork,
};

use super::super::support::{ensure_can_modify, issue_offer_number, load_offer, record_activity};
use super::notify_responsible;

#[derive(Debug, Clone)]
pub struct SendOfferCommand {
    pub offer_id: OfferId,
}

/// Handler for `draft | in_progress -> sent`.
///
/// Issues the offer number when the offer has none yet and stamps the
/// expiration date `validity_days` after sending.
pub struct SendOfferHandler {
    offers: Arc<dyn OfferReader>,
    uow: Arc<dyn UnitOfWork>,
    sequence: Arc<dyn NumberSequence>,
    activities: Arc<dyn ActivityRecorder>,
    notifications: Arc<dyn NotificationSink>,
    validity_days: i64,
}

impl SendOfferHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        uow: Arc<dyn UnitOfWork>,
        sequence: Arc<dyn NumberSequence>,
        activities: Arc<dyn ActivityRecorder>,
        notifications: Arc<dyn NotificationSink>,
        validity_days: i64,
    ) -> Self {
        Self {
            offers,
            uow,
            sequence,
            activities,
            notifications,
            validity_days,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<Offer, CommandError> {
        let caller = &metadata.caller;

        // 1. Load and authorize
        let mut offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_modify(caller, &offer)?;

        // 2. Phase check before consuming a sequence value
        if !matches!(offer.phase, OfferPhase::Draft | OfferPhase::InProgress) {
            return Err(OfferError::NotInDraftPhase(offer.phase).into());
        }
        let issued = if offer.needs_number_for(OfferPhase::Sent) {
            Some(issue_offer_number(self.sequence.as_ref(), &offer.company_id).await?)
        } else {
            None
        };

        // 3. Transition and persist
        let from = offer.phase;
        offer.send(issued, self.validity_days)?;
        self.uow
            .commit(ChangeSet::new().with(Change::UpdateOffer(offer.clone())))
            .await?;
        debug!(offer_id = %offer.id, number = ?offer.offer_number, "offer sent");

        // 4. Side effects
        let message = format!(
            "Offer '{}' was sent to the customer (phase: {} -> {})",
            offer.title, from, offer.phase
        );
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(offer.id, "Offer sent", message.clone(), caller),
        )
        .await;
        notify_responsible(
            self.notifications.as_ref(),
            &offer,
            caller,
            NotificationKind::OfferSent,
            "Offer sent",
            message,
        )
        .await;

        Ok(offer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{manager, metadata, owner, Fixture};
    use crate::domain::foundation::{ErrorCode, Timestamp};

    fn handler(f: &Fixture) -> SendOfferHandler {
        SendOfferHandler::new(
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.activities.clone(),
            f.notifications.clone(),
            60,
        )
    }

    #[tokio::test]
    async fn draft_gets_number_and_expiration() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Draft);

        let sent = handler(&f)
            .handle(SendOfferCommand { offer_id: offer.id }, metadata(owner()))
            .await
            .unwrap();

        assert_eq!(sent.phase, OfferPhase::Sent);
        assert_eq!(sent.probability, 50);
        let year = Timestamp::now().year();
        assert_eq!(
            sent.offer_number.as_ref().unwrap().as_str(),
            format!("ST-{}-001", year)
        );
        let sent_date = sent.sent_date.unwrap();
        assert_eq!(sent.expiration_date, Some(sent_date.plus_days(60)));
        assert_eq!(f.store.offer(&offer.id).unwrap().phase, OfferPhase::Sent);
    }

    #[tokio::test]
    async fn numbered_offer_keeps_its_number() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::InProgress);

        let sent = handler(&f)
            .handle(SendOfferCommand { offer_id: offer.id }, metadata(owner()))
            .await
            .unwrap();

        assert_eq!(sent.offer_number, offer.offer_number);
    }

    #[tokio::test]
    async fn sent_offer_cannot_be_sent_again() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Sent);

        let err = handler(&f)
            .handle(SendOfferCommand { offer_id: offer.id }, metadata(owner()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::OfferNotInDraftPhase);
    }

    #[tokio::test]
    async fn responsible_user_is_notified_when_manager_sends() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Draft);

        handler(&f)
            .handle(SendOfferCommand { offer_id: offer.id }, metadata(manager()))
            .await
            .unwrap();

        let sent = f.notifications.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::OfferSent);
        assert_eq!(sent[0].recipient, owner().user_id);
    }
}
