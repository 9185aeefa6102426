//! DeleteBudgetLinesByParentHandler - Command handler for clearing a budget.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::BudgetParent;
use crate::domain::foundation::CommandMetadata;
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, OfferReader, ProjectReader, UnitOfWork,
};

use super::super::support::{load_parent, record_activity};

#[derive(Debug, Clone)]
pub struct DeleteBudgetLinesByParentCommand {
    pub parent: BudgetParent,
}

#[derive(Debug, Clone)]
pub struct DeleteBudgetLinesByParentResult {
    pub deleted: u32,
}

/// Handler for removing every line of a parent.
///
/// A parent without lines is left untouched.
pub struct DeleteBudgetLinesByParentHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl DeleteBudgetLinesByParentHandler {
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
        cmd: DeleteBudgetLinesByParentCommand,
        metadata: CommandMetadata,
    ) -> Result<DeleteBudgetLinesByParentResult, CommandError> {
        let parent = load_parent(self.offers.as_ref(), self.projects.as_ref(), cmd.parent).await?;
        parent.ensure_can_modify(&metadata.caller)?;

        let deleted = self.lines.count_by_parent(&cmd.parent).await?;
        if deleted == 0 {
            return Ok(DeleteBudgetLinesByParentResult { deleted });
        }

        self.uow
            .commit(
                ChangeSet::new()
                    .with(Change::DeleteBudgetLinesByParent(cmd.parent))
                    .with(Change::RecomputeParentAggregate(cmd.parent)),
            )
            .await?;

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                cmd.parent,
                "Budget lines cleared",
                format!("Removed all {} budget lines", deleted),
                &metadata.caller,
            ),
        )
        .await;

        Ok(DeleteBudgetLinesByParentResult { deleted })
    }
}
