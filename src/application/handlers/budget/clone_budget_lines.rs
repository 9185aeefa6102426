//! CloneBudgetLinesHandler - Command handler for copying a budget between parents.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{BudgetLine, BudgetParent, BudgetSummary};
use crate::domain::foundation::CommandMetadata;
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, OfferReader, ProjectReader, UnitOfWork,
};

use super::super::support::{load_parent, record_activity};
use super::plan_clone;

#[derive(Debug, Clone)]
pub struct CloneBudgetLinesCommand {
    pub source: BudgetParent,
    pub target: BudgetParent,
}

#[derive(Debug, Clone)]
pub struct CloneBudgetLinesResult {
    pub lines: Vec<BudgetLine>,
    pub target_summary: BudgetSummary,
}

/// Handler for cloning budget lines onto another parent.
///
/// Copies are appended after any lines the target already has.
pub struct CloneBudgetLinesHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl CloneBudgetLinesHandler {
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
        cmd: CloneBudgetLinesCommand,
        metadata: CommandMetadata,
    ) -> Result<CloneBudgetLinesResult, CommandError> {
        // 1. Both parents must exist; the source is read, the target modified
        let source = load_parent(self.offers.as_ref(), self.projects.as_ref(), cmd.source).await?;
        source.ensure_can_read(&metadata.caller)?;
        let target = load_parent(self.offers.as_ref(), self.projects.as_ref(), cmd.target).await?;
        target.ensure_can_modify(&metadata.caller)?;

        // 2. Plan the copies
        let copies = plan_clone(self.lines.as_ref(), cmd.source, cmd.target).await?;

        // 3. Insert all copies and recompute in one transaction
        let mut changes = ChangeSet::new();
        changes.extend(copies.iter().cloned().map(Change::InsertBudgetLine));
        changes.push(Change::RecomputeParentAggregate(cmd.target));
        let outcome = self.uow.commit(changes).await?;
        let target_summary = outcome.summary_for(&cmd.target).copied().unwrap_or_default();
        debug!(source = %cmd.source, target = %cmd.target, count = copies.len(), "budget lines cloned");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                cmd.target,
                "Budget lines cloned",
                format!(
                    "Cloned {} budget lines from {}",
                    copies.len(),
                    cmd.source.kind().as_str()
                ),
                &metadata.caller,
            ),
        )
        .await;

        Ok(CloneBudgetLinesResult {
            lines: copies,
            target_summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, Fixture};
    use crate::domain::foundation::{CompanyId, ErrorCode, ProjectId};
    use crate::domain::offer::OfferPhase;
    use crate::domain::project::ProjectPhase;

    fn handler(f: &Fixture) -> CloneBudgetLinesHandler {
        CloneBudgetLinesHandler::new(
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.activities.clone(),
        )
    }

    #[tokio::test]
    async fn copies_lines_in_order_and_syncs_target() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Won);
        let project = f.project(ProjectPhase::Planning, 0.0);
        let source = BudgetParent::Offer(offer.id);
        let target = BudgetParent::Project(project.id);
        f.line(source, "Steel", 100.0, 125.0);
        f.line(source, "Labour", 50.0, 80.0);

        let result = handler(&f)
            .handle(CloneBudgetLinesCommand { source, target }, metadata(owner()))
            .await
            .unwrap();

        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.target_summary.total_revenue, 205.0);
        let cloned = f.store.lines_of(&target);
        assert_eq!(cloned[0].name.as_str(), "Steel");
        assert_eq!(cloned[1].name.as_str(), "Labour");
        assert_eq!(f.store.lines_of(&source).len(), 2);
        assert_eq!(f.store.project(&project.id).unwrap().value, 205.0);
    }

    #[tokio::test]
    async fn empty_source_is_rejected() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Draft);
        let project = f.project(ProjectPhase::Planning, 0.0);

        let err = handler(&f)
            .handle(
                CloneBudgetLinesCommand {
                    source: BudgetParent::Offer(offer.id),
                    target: BudgetParent::Project(project.id),
                },
                metadata(owner()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::SourceLinesNotFound);
    }

    #[tokio::test]
    async fn missing_target_is_rejected() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Draft);
        f.line(BudgetParent::Offer(offer.id), "Steel", 1.0, 1.0);

        let err = handler(&f)
            .handle(
                CloneBudgetLinesCommand {
                    source: BudgetParent::Offer(offer.id),
                    target: BudgetParent::Project(ProjectId::new()),
                },
                metadata(owner()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ParentNotFound);
    }

    #[tokio::test]
    async fn source_of_another_company_is_forbidden() {
        let f = Fixture::new();
        let mut foreign = f.offer(OfferPhase::Won);
        foreign.company_id = CompanyId::new("tak").unwrap();
        f.store.seed_offer(foreign.clone());
        let source = BudgetParent::Offer(foreign.id);
        f.line(source, "Steel", 100.0, 125.0);
        let project = f.project(ProjectPhase::Planning, 0.0);
        let target = BudgetParent::Project(project.id);

        let err = handler(&f)
            .handle(CloneBudgetLinesCommand { source, target }, metadata(owner()))
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Forbidden(_)));
        assert!(f.store.lines_of(&target).is_empty());
        assert_eq!(f.store.project(&project.id).unwrap().value, 0.0);
    }
}
