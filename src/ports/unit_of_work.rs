//! Transactional write port.
//!
//! Every mutating handler describes its writes as a [`ChangeSet`] and hands
//! it to [`UnitOfWork::commit`]. The adapter applies the changes in order
//! inside one transaction: either all of them become visible or none do.
//!
//! [`Change::RecomputeParentAggregate`] is evaluated by the adapter, inside
//! the transaction, from the lines as they stand after the preceding
//! changes. The resulting summaries are reported back in the
//! [`CommitOutcome`] so the caller can return fresh snapshots without a
//! second read.

use crate::domain::budget::{BudgetLine, BudgetParent, BudgetSummary};
use crate::domain::deal::{Deal, StageHistoryEntry};
use crate::domain::foundation::{BudgetLineId, DomainError};
use crate::domain::offer::Offer;
use crate::domain::project::Project;
use async_trait::async_trait;

/// A single write inside a change set.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    InsertDeal(Deal),
    UpdateDeal(Deal),
    InsertOffer(Offer),
    /// Writes every column except value, cost, margin and the
    /// detailed-budget flag, which keep their stored values.
    UpdateOffer(Offer),
    InsertProject(Project),
    /// Writes every column except value, cost and the detailed-budget flag,
    /// which keep their stored values. Health is classified against the
    /// stored value.
    UpdateProject(Project),
    /// Writes value, cost, health and the detailed-budget flag as given.
    SetProjectBudget(Project),
    InsertBudgetLine(BudgetLine),
    UpdateBudgetLine(BudgetLine),
    DeleteBudgetLine(BudgetLineId),
    /// Removes every line of the parent.
    DeleteBudgetLinesByParent(BudgetParent),
    /// Assigns display orders `0..n` following `ordered_ids`.
    ReorderBudgetLines {
        parent: BudgetParent,
        ordered_ids: Vec<BudgetLineId>,
    },
    /// Summarizes the parent's lines and writes value, cost and margin
    /// (offer) or value, cost and health (project) onto the parent row.
    RecomputeParentAggregate(BudgetParent),
    AppendStageHistory(StageHistoryEntry),
}

/// Ordered list of changes committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a change, builder style.
    pub fn with(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn extend(&mut self, changes: impl IntoIterator<Item = Change>) {
        self.changes.extend(changes);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

/// What a successful commit computed along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOutcome {
    /// One entry per `RecomputeParentAggregate`, in change order.
    pub recomputed: Vec<(BudgetParent, BudgetSummary)>,
}

impl CommitOutcome {
    /// The last summary computed for `parent`, if any.
    pub fn summary_for(&self, parent: &BudgetParent) -> Option<&BudgetSummary> {
        self.recomputed
            .iter()
            .rev()
            .find(|(p, _)| p == parent)
            .map(|(_, summary)| summary)
    }
}

/// Port for atomic persistence of change sets.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Applies `changes` in order inside one transaction.
    ///
    /// # Errors
    ///
    /// - `DealNotFound` / `OfferNotFound` / `ProjectNotFound` /
    ///   `BudgetLineNotFound` when an update or delete targets a missing row
    /// - `Conflict` on a duplicate offer number
    /// - `DatabaseError` on persistence failure
    ///
    /// On any error nothing is persisted.
    async fn commit(&self, changes: ChangeSet) -> Result<CommitOutcome, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OfferId, ProjectId};

    #[test]
    fn unit_of_work_is_object_safe() {
        fn _accepts_dyn(_uow: &dyn UnitOfWork) {}
    }

    #[test]
    fn change_set_keeps_insertion_order() {
        let offer = BudgetParent::Offer(OfferId::new());
        let project = BudgetParent::Project(ProjectId::new());
        let set = ChangeSet::new()
            .with(Change::DeleteBudgetLinesByParent(offer))
            .with(Change::RecomputeParentAggregate(offer))
            .with(Change::RecomputeParentAggregate(project));

        assert_eq!(set.len(), 3);
        assert_eq!(set.changes()[0], Change::DeleteBudgetLinesByParent(offer));
        assert_eq!(set.changes()[2], Change::RecomputeParentAggregate(project));
    }

    #[test]
    fn summary_for_returns_latest_entry() {
        let parent = BudgetParent::Offer(OfferId::new());
        let first = BudgetSummary::default();
        let second = BudgetSummary {
            line_count: 1,
            total_cost: 80.0,
            total_revenue: 100.0,
            total_profit: 20.0,
            margin_percent: 20.0,
        };
        let outcome = CommitOutcome {
            recomputed: vec![(parent, first), (parent, second)],
        };

        assert_eq!(outcome.summary_for(&parent), Some(&second));
        assert!(outcome
            .summary_for(&BudgetParent::Project(ProjectId::new()))
            .is_none());
    }
}
