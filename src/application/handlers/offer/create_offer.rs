//! CreateOfferHandler - Command handler for creating offers.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, CompanyId, CustomerId, DealId, Timestamp, UserId};
use crate::domain::offer::{NewOffer, Offer, OfferPhase};
use crate::ports::{ActivityRecorder, Change, ChangeSet, NumberSequence, UnitOfWork};

use super::super::support::{issue_offer_number, record_activity};

/// Probability of a new draft when the caller gives none.
const DEFAULT_DRAFT_PROBABILITY: u8 = 10;

#[derive(Debug, Clone)]
pub struct CreateOfferCommand {
    pub title: String,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    /// Defaults to the caller's company.
    pub company_id: Option<CompanyId>,
    /// Defaults to draft. Any other open phase issues a number immediately.
    pub phase: Option<OfferPhase>,
    pub probability: Option<u8>,
    pub value: f64,
    /// Defaults to the caller.
    pub responsible_user_id: Option<UserId>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<Timestamp>,
    pub deal_id: Option<DealId>,
}

/// Handler for creating offers.
pub struct CreateOfferHandler {
    uow: Arc<dyn UnitOfWork>,
    sequence: Arc<dyn NumberSequence>,
    activities: Arc<dyn ActivityRecorder>,
}

impl CreateOfferHandler {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        sequence: Arc<dyn NumberSequence>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            uow,
            sequence,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<Offer, CommandError> {
        let caller = &metadata.caller;

        // 1. Resolve the company and check access
        let company_id = cmd.company_id.unwrap_or_else(|| caller.company_id.clone());
        if !caller.can_access_company(&company_id) {
            return Err(CommandError::Forbidden(format!(
                "user {} may not create offers for company {}",
                caller.user_id, company_id
            )));
        }

        // 2. Issue a number up front for non-draft offers
        let phase = cmd.phase.unwrap_or(OfferPhase::Draft);
        let issued = if phase != OfferPhase::Draft && !phase.is_closed() {
            Some(issue_offer_number(self.sequence.as_ref(), &company_id).await?)
        } else {
            None
        };

        // 3. Build the offer
        let offer = Offer::create(
            NewOffer {
                title: cmd.title,
                customer_id: cmd.customer_id,
                customer_name: cmd.customer_name,
                company_id,
                phase,
                probability: cmd.probability.unwrap_or(DEFAULT_DRAFT_PROBABILITY),
                value: cmd.value,
                responsible_user_id: cmd
                    .responsible_user_id
                    .or_else(|| Some(caller.user_id.clone())),
                description: cmd.description,
                notes: cmd.notes,
                due_date: cmd.due_date,
                deal_id: cmd.deal_id,
            },
            issued,
            caller,
        )?;

        // 4. Persist
        self.uow
            .commit(ChangeSet::new().with(Change::InsertOffer(offer.clone())))
            .await?;
        debug!(offer_id = %offer.id, phase = %offer.phase, "offer created");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                offer.id,
                "Offer created",
                format!(
                    "Offer '{}' was created for customer {}",
                    offer.title,
                    offer.customer_name.as_deref().unwrap_or("-")
                ),
                caller,
            ),
        )
        .await;

        Ok(offer)
    }
}
