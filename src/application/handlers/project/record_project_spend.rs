//! RecordProjectSpendHandler - Command handler for reporting spend to date.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, ProjectId};
use crate::domain::project::{Project, ProjectHealth};
use crate::ports::{ActivityRecorder, Change, ChangeSet, ProjectReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_project, record_activity};

#[derive(Debug, Clone)]
pub struct RecordProjectSpendCommand {
    pub project_id: ProjectId,
    /// Total spent so far, replacing the previous figure.
    pub spent: f64,
}

pub struct RecordProjectSpendHandler {
    projects: Arc<dyn ProjectReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl RecordProjectSpendHandler {
    pub fn new(
        projects: Arc<dyn ProjectReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            projects,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordProjectSpendCommand,
        metadata: CommandMetadata,
    ) -> Result<Project, CommandError> {
        let mut project = load_project(self.projects.as_ref(), cmd.project_id).await?;
        ensure_can_modify(&metadata.caller, &project)?;

        let before = project.health;
        project.record_spend(cmd.spent)?;
        self.uow
            .commit(ChangeSet::new().with(Change::UpdateProject(project.clone())))
            .await?;

        if project.health != before && project.health != ProjectHealth::OnTrack {
            warn!(project_id = %project.id, health = %project.health, "project budget health degraded");
        } else {
            debug!(project_id = %project.id, health = %project.health, "project spend recorded");
        }

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                project.id,
                "Project spend updated",
                format!(
                    "Project '{}' has spent {:.2} of {:.2} ({})",
                    project.name, project.spent, project.value, project.health
                ),
                &metadata.caller,
            ),
        )
        .await;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, Fixture};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::project::ProjectPhase;

    fn handler(f: &Fixture) -> RecordProjectSpendHandler {
        RecordProjectSpendHandler::new(f.store.clone(), f.store.clone(), f.activities.clone())
    }

    async fn spend(f: &Fixture, project_id: ProjectId, spent: f64) -> Project {
        handler(f)
            .handle(RecordProjectSpendCommand { project_id, spent }, metadata(owner()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_follows_spend_ratio() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Active, 100_000.0);

        assert_eq!(spend(&f, project.id, 50_000.0).await.health, ProjectHealth::OnTrack);
        assert_eq!(spend(&f, project.id, 110_000.0).await.health, ProjectHealth::OnTrack);
        assert_eq!(spend(&f, project.id, 115_000.0).await.health, ProjectHealth::AtRisk);
        assert_eq!(spend(&f, project.id, 120_000.0).await.health, ProjectHealth::AtRisk);
        assert_eq!(spend(&f, project.id, 125_000.0).await.health, ProjectHealth::OverBudget);

        let stored = f.store.project(&project.id).unwrap();
        assert_eq!(stored.spent, 125_000.0);
        assert_eq!(stored.health, ProjectHealth::OverBudget);
    }

    #[tokio::test]
    async fn negative_spend_is_rejected() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Active, 100.0);

        let err = handler(&f)
            .handle(
                RecordProjectSpendCommand {
                    project_id: project.id,
                    spent: -1.0,
                },
                metadata(owner()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidSpend);
    }
}
