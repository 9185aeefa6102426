//! UpdateProjectPhaseHandler - Command handler for project phase changes.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, ProjectId};
use crate::domain::project::{Project, ProjectPhase};
use crate::ports::{ActivityRecorder, Change, ChangeSet, ProjectReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_project, record_activity};

#[derive(Debug, Clone)]
pub struct UpdateProjectPhaseCommand {
    pub project_id: ProjectId,
    pub phase: ProjectPhase,
}

pub struct UpdateProjectPhaseHandler {
    projects: Arc<dyn ProjectReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl UpdateProjectPhaseHandler {
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
        cmd: UpdateProjectPhaseCommand,
        metadata: CommandMetadata,
    ) -> Result<Project, CommandError> {
        let mut project = load_project(self.projects.as_ref(), cmd.project_id).await?;
        ensure_can_modify(&metadata.caller, &project)?;

        let from = project.phase;
        if !project.update_phase(cmd.phase)? {
            return Ok(project);
        }

        self.uow
            .commit(ChangeSet::new().with(Change::UpdateProject(project.clone())))
            .await?;
        debug!(project_id = %project.id, from = %from, to = %project.phase, "project phase changed");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                project.id,
                "Project phase changed",
                format!("Project '{}' moved from {} to {}", project.name, from, project.phase),
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

    fn handler(f: &Fixture) -> UpdateProjectPhaseHandler {
        UpdateProjectPhaseHandler::new(f.store.clone(), f.store.clone(), f.activities.clone())
    }

    #[tokio::test]
    async fn moves_between_open_phases() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Active, 1_000.0);

        let updated = handler(&f)
            .handle(
                UpdateProjectPhaseCommand {
                    project_id: project.id,
                    phase: ProjectPhase::OnHold,
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        assert_eq!(updated.phase, ProjectPhase::OnHold);
        assert_eq!(f.store.project(&project.id).unwrap().phase, ProjectPhase::OnHold);
    }

    #[tokio::test]
    async fn same_phase_writes_nothing() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Planning, 1_000.0);

        handler(&f)
            .handle(
                UpdateProjectPhaseCommand {
                    project_id: project.id,
                    phase: ProjectPhase::Planning,
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        assert!(f.activities.entries().is_empty());
    }

    #[tokio::test]
    async fn terminal_phases_are_final() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Cancelled, 1_000.0);

        let err = handler(&f)
            .handle(
                UpdateProjectPhaseCommand {
                    project_id: project.id,
                    phase: ProjectPhase::Active,
                },
                metadata(owner()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidPhaseTransition);
    }
}
