//! UpdateProjectCompletionHandler - Command handler for progress updates.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, ProjectId};
use crate::domain::project::Project;
use crate::ports::{ActivityRecorder, Change, ChangeSet, ProjectReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_project, record_activity};

#[derive(Debug, Clone)]
pub struct UpdateProjectCompletionCommand {
    pub project_id: ProjectId,
    pub completion_percent: f64,
}

#[derive(Debug, Clone)]
pub struct UpdateProjectCompletionResult {
    pub project: Project,
    /// True when reaching 100% moved an active project to completed.
    pub auto_completed: bool,
}

pub struct UpdateProjectCompletionHandler {
    projects: Arc<dyn ProjectReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl UpdateProjectCompletionHandler {
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
        cmd: UpdateProjectCompletionCommand,
        metadata: CommandMetadata,
    ) -> Result<UpdateProjectCompletionResult, CommandError> {
        let mut project = load_project(self.projects.as_ref(), cmd.project_id).await?;
        ensure_can_modify(&metadata.caller, &project)?;

        let auto_completed = project.update_completion(cmd.completion_percent)?;
        self.uow
            .commit(ChangeSet::new().with(Change::UpdateProject(project.clone())))
            .await?;
        debug!(
            project_id = %project.id,
            completion = project.completion_percent,
            auto_completed,
            "project completion updated"
        );

        let (title, body) = if auto_completed {
            (
                "Project completed",
                format!("Project '{}' reached 100% and was completed", project.name),
            )
        } else {
            (
                "Project progress updated",
                format!(
                    "Project '{}' is {:.0}% complete",
                    project.name, project.completion_percent
                ),
            )
        };
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(project.id, title, body, &metadata.caller),
        )
        .await;

        Ok(UpdateProjectCompletionResult {
            project,
            auto_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, Fixture};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::project::ProjectPhase;

    fn handler(f: &Fixture) -> UpdateProjectCompletionHandler {
        UpdateProjectCompletionHandler::new(f.store.clone(), f.store.clone(), f.activities.clone())
    }

    fn complete(project_id: ProjectId, completion_percent: f64) -> UpdateProjectCompletionCommand {
        UpdateProjectCompletionCommand {
            project_id,
            completion_percent,
        }
    }

    #[tokio::test]
    async fn hundred_percent_completes_active_project() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Active, 1_000.0);

        let result = handler(&f)
            .handle(complete(project.id, 100.0), metadata(owner()))
            .await
            .unwrap();

        assert!(result.auto_completed);
        assert_eq!(result.project.phase, ProjectPhase::Completed);
        assert_eq!(
            f.store.project(&project.id).unwrap().phase,
            ProjectPhase::Completed
        );
        assert_eq!(f.activities.titles(), vec!["Project completed".to_string()]);
    }

    #[tokio::test]
    async fn partial_progress_keeps_phase() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Active, 1_000.0);

        let result = handler(&f)
            .handle(complete(project.id, 40.0), metadata(owner()))
            .await
            .unwrap();

        assert!(!result.auto_completed);
        assert_eq!(result.project.phase, ProjectPhase::Active);
        assert_eq!(result.project.completion_percent, 40.0);
    }

    #[tokio::test]
    async fn out_of_range_is_rejected() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Active, 1_000.0);

        let err = handler(&f)
            .handle(complete(project.id, 101.0), metadata(owner()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidCompletionPercent);
    }
}
