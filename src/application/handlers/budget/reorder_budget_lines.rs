//! ReorderBudgetLinesHandler - Command handler for reordering a budget.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{validate_reorder, BudgetParent};
use crate::domain::foundation::{BudgetLineId, CommandMetadata};
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, OfferReader, ProjectReader, UnitOfWork,
};

use super::super::support::{load_parent, record_activity};

/// Command to reorder all lines of a parent.
///
/// Position in `ordered_ids` becomes the new display order.
#[derive(Debug, Clone)]
pub struct ReorderBudgetLinesCommand {
    pub parent: BudgetParent,
    pub ordered_ids: Vec<BudgetLineId>,
}

/// Handler for reordering budget lines.
pub struct ReorderBudgetLinesHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl ReorderBudgetLinesHandler {
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
        cmd: ReorderBudgetLinesCommand,
        metadata: CommandMetadata,
    ) -> Result<(), CommandError> {
        // 1. Authorize against the parent
        let parent = load_parent(self.offers.as_ref(), self.projects.as_ref(), cmd.parent).await?;
        parent.ensure_can_modify(&metadata.caller)?;

        // 2. The list must be a permutation of the current lines
        let current = self.lines.list_by_parent(&cmd.parent).await?;
        validate_reorder(&current, &cmd.ordered_ids)?;

        // 3. Single batch write
        let count = cmd.ordered_ids.len();
        self.uow
            .commit(ChangeSet::new().with(Change::ReorderBudgetLines {
                parent: cmd.parent,
                ordered_ids: cmd.ordered_ids,
            }))
            .await?;

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                cmd.parent,
                "Budget lines reordered",
                format!("Reordered {} budget lines", count),
                &metadata.caller,
            ),
        )
        .await;

        Ok(())
    }
}
