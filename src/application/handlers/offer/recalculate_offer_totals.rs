//! RecalculateOfferTotalsHandler - Re-derives an offer's value from its budget.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::budget::BudgetParent;
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::Offer;
use crate::ports::{Change, ChangeSet, OfferReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_offer};

#[derive(Debug, Clone)]
pub struct RecalculateOfferTotalsCommand {
    pub offer_id: OfferId,
}

/// Idempotent; running it twice yields the same totals.
pub struct RecalculateOfferTotalsHandler {
    offers: Arc<dyn OfferReader>,
    uow: Arc<dyn UnitOfWork>,
}

impl RecalculateOfferTotalsHandler {
    pub fn new(offers: Arc<dyn OfferReader>, uow: Arc<dyn UnitOfWork>) -> Self {
        Self { offers, uow }
    }

    pub async fn handle(
        &self,
        cmd: RecalculateOfferTotalsCommand,
        metadata: CommandMetadata,
    ) -> Result<Offer, CommandError> {
        let mut offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_modify(&metadata.caller, &offer)?;

        let parent = BudgetParent::Offer(offer.id);
        let outcome = self
            .uow
            .commit(ChangeSet::new().with(Change::RecomputeParentAggregate(parent)))
            .await?;
        if let Some(summary) = outcome.summary_for(&parent) {
            offer.apply_budget_summary(summary);
        }
        debug!(offer_id = %offer.id, value = offer.value, "offer totals recalculated");

        Ok(offer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, Fixture};
    use crate::domain::offer::OfferPhase;

    #[tokio::test]
    async fn value_matches_line_revenue_and_is_idempotent() {
        let f = Fixture::new();
        let mut offer = f.offer(OfferPhase::InProgress);
        offer.value = 1.0;
        f.store.seed_offer(offer.clone());
        f.line(BudgetParent::Offer(offer.id), "Steel", 100.0, 125.0);
        f.line(BudgetParent::Offer(offer.id), "Paint", 40.0, 75.0);
        let handler = RecalculateOfferTotalsHandler::new(f.store.clone(), f.store.clone());
        let cmd = RecalculateOfferTotalsCommand { offer_id: offer.id };

        let first = handler.handle(cmd.clone(), metadata(owner())).await.unwrap();
        let second = handler.handle(cmd, metadata(owner())).await.unwrap();

        assert_eq!(first.value, 200.0);
        assert_eq!(first.cost, 140.0);
        assert!((first.margin_percent - 30.0).abs() < 1e-9);
        assert_eq!(second.value, first.value);
        assert_eq!(f.store.offer(&offer.id).unwrap().value, 200.0);
    }

    #[tokio::test]
    async fn offer_without_lines_resets_to_zero() {
        let f = Fixture::new();
        let mut offer = f.offer(OfferPhase::Draft);
        offer.value = 5_000.0;
        f.store.seed_offer(offer.clone());

        let result = RecalculateOfferTotalsHandler::new(f.store.clone(), f.store.clone())
            .handle(RecalculateOfferTotalsCommand { offer_id: offer.id }, metadata(owner()))
            .await
            .unwrap();

        assert_eq!(result.value, 0.0);
        assert!(!result.has_detailed_budget);
    }
}
