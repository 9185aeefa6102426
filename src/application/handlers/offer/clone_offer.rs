//! CloneOfferHandler - Command handler for starting a new draft from an offer.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{BudgetLine, BudgetParent};
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::Offer;
use crate::ports::{ActivityRecorder, BudgetLineReader, Change, ChangeSet, OfferReader, UnitOfWork};

use super::super::support::{
    copy_budget_to_new_parent, ensure_can_read, load_offer, record_activity,
};

#[derive(Debug, Clone)]
pub struct CloneOfferCommand {
    pub offer_id: OfferId,
    /// Defaults to `Copy of <title>`.
    pub new_title: Option<String>,
    pub include_budget: bool,
}

#[derive(Debug, Clone)]
pub struct CloneOfferResult {
    pub offer: Offer,
    pub lines: Vec<BudgetLine>,
}

/// Handler for cloning offers. The source is only read, so any caller who
/// can see it may clone it; the copy belongs to the caller.
pub struct CloneOfferHandler {
    offers: Arc<dyn OfferReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl CloneOfferHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        lines: Arc<dyn BudgetLineReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            offers,
            lines,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: CloneOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<CloneOfferResult, CommandError> {
        let caller = &metadata.caller;

        // 1. Load the source and draft the copy
        let source = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_read(caller, &source)?;
        let mut offer = source.clone_as_draft(cmd.new_title, caller)?;
        let mut changes = ChangeSet::new().with(Change::InsertOffer(offer.clone()));

        // 2. Optionally copy the budget
        let target = BudgetParent::Offer(offer.id);
        let lines = if cmd.include_budget {
            copy_budget_to_new_parent(self.lines.as_ref(), BudgetParent::Offer(source.id), target)
                .await?
        } else {
            Vec::new()
        };
        if !lines.is_empty() {
            changes.extend(lines.iter().cloned().map(Change::InsertBudgetLine));
            changes.push(Change::RecomputeParentAggregate(target));
        }

        // 3. Commit
        let outcome = self.uow.commit(changes).await?;
        if let Some(summary) = outcome.summary_for(&target) {
            offer.apply_budget_summary(summary);
        }
        debug!(source_id = %source.id, offer_id = %offer.id, lines = lines.len(), "offer cloned");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                offer.id,
                "Offer cloned",
                format!("Offer '{}' was cloned from '{}'", offer.title, source.title),
                caller,
            ),
        )
        .await;

        Ok(CloneOfferResult { offer, lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, stranger, Fixture};
    use crate::domain::offer::OfferPhase;

    fn handler(f: &Fixture) -> CloneOfferHandler {
        CloneOfferHandler::new(
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.activities.clone(),
        )
    }

    #[tokio::test]
    async fn clone_restarts_as_unnumbered_draft_with_budget() {
        let f = Fixture::new();
        let source = f.offer(OfferPhase::Won);
        f.line(BudgetParent::Offer(source.id), "Steel", 100.0, 150.0);
        f.line(BudgetParent::Offer(source.id), "Bolts", 10.0, 20.0);

        let result = handler(&f)
            .handle(
                CloneOfferCommand {
                    offer_id: source.id,
                    new_title: None,
                    include_budget: true,
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        assert_eq!(result.offer.phase, OfferPhase::Draft);
        assert_eq!(result.offer.offer_number, None);
        assert_eq!(result.offer.title, "Copy of Warehouse roof");
        assert_eq!(result.offer.value, 170.0);
        assert_eq!(result.lines.len(), 2);
        assert_eq!(
            f.store.lines_of(&BudgetParent::Offer(result.offer.id)).len(),
            2
        );
        // the source is untouched
        assert_eq!(f.store.lines_of(&BudgetParent::Offer(source.id)).len(), 2);
        assert_eq!(f.store.offer(&source.id).unwrap().phase, OfferPhase::Won);
    }

    #[tokio::test]
    async fn clone_without_budget_copies_no_lines() {
        let f = Fixture::new();
        let source = f.offer(OfferPhase::Sent);
        f.line(BudgetParent::Offer(source.id), "Steel", 100.0, 150.0);

        let result = handler(&f)
            .handle(
                CloneOfferCommand {
                    offer_id: source.id,
                    new_title: Some("Variant B".to_string()),
                    include_budget: false,
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        assert_eq!(result.offer.title, "Variant B");
        assert!(result.lines.is_empty());
        assert!(f.store.lines_of(&BudgetParent::Offer(result.offer.id)).is_empty());
        assert!(!result.offer.has_detailed_budget);
    }

    #[tokio::test]
    async fn other_company_cannot_clone() {
        let f = Fixture::new();
        let source = f.offer(OfferPhase::Sent);

        let err = handler(&f)
            .handle(
                CloneOfferCommand {
                    offer_id: source.id,
                    new_title: None,
                    include_budget: false,
                },
                metadata(stranger()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Forbidden(_)));
        assert_eq!(f.store.offer_count(), 1);
    }
}
