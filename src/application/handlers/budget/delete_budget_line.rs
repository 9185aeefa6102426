//! DeleteBudgetLineHandler - Command handler for removing a budget line.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{BudgetError, BudgetSummary};
use crate::domain::foundation::{BudgetLineId, CommandMetadata};
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, OfferReader, ProjectReader, UnitOfWork,
};

use super::super::support::{load_parent, record_activity};

#[derive(Debug, Clone)]
pub struct DeleteBudgetLineCommand {
    pub line_id: BudgetLineId,
}

#[derive(Debug, Clone)]
pub struct DeleteBudgetLineResult {
    /// Parent aggregate after the removal; all zeros when the last line went.
    pub summary: BudgetSummary,
}

/// Handler for deleting budget lines.
///
/// Remaining lines are renumbered so display orders stay contiguous.
pub struct DeleteBudgetLineHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl DeleteBudgetLineHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        projects: Arc<dyn ProjectReader>,
        lines: Arc<dyn BudgetLineReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            offers,
            projects,
            lines,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: DeleteBudgetLineCommand,
        metadata: CommandMetadata,
    ) -> Result<DeleteBudgetLineResult, CommandError> {
        // 1. Load and authorize
        let line = self
            .lines
            .find_by_id(&cmd.line_id)
            .await?
            .ok_or(BudgetError::LineNotFound(cmd.line_id))?;
        let parent = load_parent(self.offers.as_ref(), self.projects.as_ref(), line.parent).await?;
        parent.ensure_can_modify(&metadata.caller)?;

        // 2. Remove, close the gap, recompute
        let remaining = self
            .lines
            .list_by_parent(&line.parent)
            .await?
            .into_iter()
            .filter(|l| l.id != line.id)
            .map(|l| l.id)
            .collect();
        let outcome = self
            .uow
            .commit(
                ChangeSet::new()
                    .with(Change::DeleteBudgetLine(line.id))
                    .with(Change::ReorderBudgetLines {
                        parent: line.parent,
                        ordered_ids: remaining,
                    })
                    .with(Change::RecomputeParentAggregate(line.parent)),
            )
            .await?;
        let summary = outcome.summary_for(&line.parent).copied().unwrap_or_default();
        debug!(line_id = %line.id, "budget line deleted");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                line.parent,
                "Budget line deleted",
                format!("Deleted budget line: {}", line.name.as_str()),
                &metadata.caller,
            ),
        )
        .await;

        Ok(DeleteBudgetLineResult { summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, Fixture};
    use crate::domain::budget::BudgetParent;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::offer::OfferPhase;

    fn handler(f: &Fixture) -> DeleteBudgetLineHandler {
        DeleteBudgetLineHandler::new(
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.activities.clone(),
        )
    }

    #[tokio::test]
    async fn deleting_last_line_resets_value() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Draft);
        let parent = BudgetParent::Offer(offer.id);
        let line = f.line(parent, "Only", 50.0, 75.0);

        let result = handler(&f)
            .handle(DeleteBudgetLineCommand { line_id: line.id }, metadata(owner()))
            .await
            .unwrap();

        assert!(result.summary.is_empty());
        let stored = f.store.offer(&offer.id).unwrap();
        assert_eq!(stored.value, 0.0);
        assert_eq!(stored.cost, 0.0);
        assert_eq!(f.activities.titles(), vec!["Budget line deleted".to_string()]);
    }

    #[tokio::test]
    async fn remaining_lines_are_renumbered() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Draft);
        let parent = BudgetParent::Offer(offer.id);
        let first = f.line(parent, "a", 1.0, 1.0);
        let second = f.line(parent, "b", 1.0, 1.0);
        let third = f.line(parent, "c", 1.0, 1.0);

        handler(&f)
            .handle(DeleteBudgetLineCommand { line_id: first.id }, metadata(owner()))
            .await
            .unwrap();

        let lines = f.store.lines_of(&parent);
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].id, lines[0].display_order), (second.id, 0));
        assert_eq!((lines[1].id, lines[1].display_order), (third.id, 1));
    }

    #[tokio::test]
    async fn missing_line_is_not_found() {
        let f = Fixture::new();
        let err = handler(&f)
            .handle(
                DeleteBudgetLineCommand {
                    line_id: BudgetLineId::new(),
                },
                metadata(owner()),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BudgetLineNotFound);
    }
}
