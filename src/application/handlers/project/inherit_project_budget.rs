//! InheritProjectBudgetHandler - Copies a won offer's budget onto a project.

use std::sync::Arc;

use tracing::info;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{clone_lines, BudgetParent};
use crate::domain::foundation::{CommandMetadata, OfferId, ProjectId};
use crate::domain::project::Project;
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, OfferReader, ProjectReader, UnitOfWork,
};

use super::super::support::{ensure_can_modify, load_offer, load_project, record_activity};

#[derive(Debug, Clone)]
pub struct InheritProjectBudgetCommand {
    pub project_id: ProjectId,
    pub offer_id: OfferId,
}

#[derive(Debug, Clone)]
pub struct InheritProjectBudgetResult {
    pub project: Project,
    pub inherited: u32,
}

/// Handler for inheriting a budget from a won offer.
///
/// Lines, link and totals are written in one transaction so the project
/// never shows a detailed budget without its lines.
pub struct InheritProjectBudgetHandler {
    projects: Arc<dyn ProjectReader>,
    offers: Arc<dyn OfferReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl InheritProjectBudgetHandler {
    pub fn new(
        projects: Arc<dyn ProjectReader>,
        offers: Arc<dyn OfferReader>,
        lines: Arc<dyn BudgetLineReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            projects,
            offers,
            lines,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: InheritProjectBudgetCommand,
        metadata: CommandMetadata,
    ) -> Result<InheritProjectBudgetResult, CommandError> {
        // 1. Load both sides; only the project is modified
        let mut project = load_project(self.projects.as_ref(), cmd.project_id).await?;
        ensure_can_modify(&metadata.caller, &project)?;
        let offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;

        // 2. Offer must be won
        project.inherit_from(&offer)?;

        // 3. Copy the lines after whatever the project already holds
        let source = BudgetParent::Offer(offer.id);
        let target = BudgetParent::Project(project.id);
        let source_lines = self.lines.list_by_parent(&source).await?;
        let copies = if source_lines.is_empty() {
            Vec::new()
        } else {
            let existing = self.lines.count_by_parent(&target).await?;
            clone_lines(&source_lines, source, target, existing as usize)?
        };
        let inherited = copies.len() as u32;

        let mut changes = ChangeSet::new()
            .with(Change::UpdateProject(project.clone()))
            .with(Change::SetProjectBudget(project.clone()));
        if !copies.is_empty() {
            changes.extend(copies.into_iter().map(Change::InsertBudgetLine));
            changes.push(Change::RecomputeParentAggregate(target));
        }

        // 4. Commit
        let outcome = self.uow.commit(changes).await?;
        if let Some(summary) = outcome.summary_for(&target) {
            project.apply_budget_summary(summary);
        }
        info!(project_id = %project.id, offer_id = %offer.id, inherited, "budget inherited");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                project.id,
                "Budget inherited",
                format!(
                    "Project '{}' inherited {} budget lines from offer '{}'",
                    project.name, inherited, offer.title
                ),
                &metadata.caller,
            ),
        )
        .await;

        Ok(InheritProjectBudgetResult { project, inherited })
    }
}
