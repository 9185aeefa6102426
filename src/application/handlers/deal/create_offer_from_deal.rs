//! CreateOfferFromDealHandler - Drafts the offer for an early-stage deal.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{BudgetLine, BudgetParent};
use crate::domain::deal::Deal;
use crate::domain::foundation::{CommandMetadata, DealId, OfferId};
use crate::domain::offer::{NewOffer, Offer, OfferPhase};
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, DealReader, OfferReader, UnitOfWork,
};

use super::super::support::{
    copy_budget_to_new_parent, ensure_can_modify, ensure_can_read, load_deal, load_offer,
    record_activity,
};

/// Probability of an offer drafted from a deal.
const DRAFTED_OFFER_PROBABILITY: u8 = 50;

#[derive(Debug, Clone)]
pub struct CreateOfferFromDealCommand {
    pub deal_id: DealId,
    /// Defaults to the deal title.
    pub title: Option<String>,
    /// Offer whose budget lines are copied onto the new offer.
    pub template_offer_id: Option<OfferId>,
}

#[derive(Debug, Clone)]
pub struct CreateOfferFromDealResult {
    pub offer: Offer,
    pub deal: Deal,
    pub lines: Vec<BudgetLine>,
}

pub struct CreateOfferFromDealHandler {
    deals: Arc<dyn DealReader>,
    offers: Arc<dyn OfferReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl CreateOfferFromDealHandler {
    pub fn new(
        deals: Arc<dyn DealReader>,
        offers: Arc<dyn OfferReader>,
        lines: Arc<dyn BudgetLineReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            deals,
            offers,
            lines,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateOfferFromDealCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateOfferFromDealResult, CommandError> {
        let caller = &metadata.caller;

        // 1. Load, authorize and check the deal can take an offer
        let mut deal = load_deal(self.deals.as_ref(), cmd.deal_id).await?;
        ensure_can_modify(caller, &deal)?;
        deal.ensure_can_create_offer()?;

        // 2. Draft the offer from the deal
        let mut offer = Offer::create(
            NewOffer {
                title: cmd
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| deal.title.clone()),
                customer_id: Some(deal.customer_id),
                customer_name: deal.customer_name.clone(),
                company_id: deal.company_id.clone(),
                phase: OfferPhase::Draft,
                probability: DRAFTED_OFFER_PROBABILITY,
                value: deal.value,
                responsible_user_id: Some(deal.owner_id.clone()),
                description: deal.description.clone(),
                notes: deal.notes.clone(),
                due_date: deal.expected_close_date,
                deal_id: Some(deal.id),
            },
            None,
            caller,
        )?;
        let mut changes = ChangeSet::new().with(Change::InsertOffer(offer.clone()));

        // 3. Copy the template budget; an empty template keeps the deal value
        let target = BudgetParent::Offer(offer.id);
        let mut lines = Vec::new();
        if let Some(template_id) = cmd.template_offer_id {
            let template = load_offer(self.offers.as_ref(), template_id).await?;
            ensure_can_read(caller, &template)?;
            lines = copy_budget_to_new_parent(
                self.lines.as_ref(),
                BudgetParent::Offer(template.id),
                target,
            )
            .await?;
            if !lines.is_empty() {
                changes.extend(lines.iter().cloned().map(Change::InsertBudgetLine));
                changes.push(Change::RecomputeParentAggregate(target));
            }
        }

        // 4. Link and advance the deal
        let history = deal.attach_offer(offer.id, caller)?;
        changes.push(Change::UpdateDeal(deal.clone()));
        changes.push(Change::AppendStageHistory(history));

        // 5. Commit
        let outcome = self.uow.commit(changes).await?;
        if let Some(summary) = outcome.summary_for(&target) {
            offer.apply_budget_summary(summary);
        }
        debug!(deal_id = %deal.id, offer_id = %offer.id, lines = lines.len(), "offer created from deal");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                deal.id,
                "Offer created from deal",
                format!(
                    "Deal '{}' advanced to proposal stage with new offer '{}'",
                    deal.title, offer.title
                ),
                caller,
            ),
        )
        .await;
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                offer.id,
                "Offer created from deal",
                format!("Offer '{}' was created from deal '{}'", offer.title, deal.title),
                caller,
            ),
        )
        .await;

        Ok(CreateOfferFromDealResult { offer, deal, lines })
    }
}
