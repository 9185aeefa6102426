//! RecalculateProjectHealthHandler - Re-derives health from spend and budget.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::foundation::{CommandMetadata, ProjectId};
use crate::domain::project::Project;
use crate::ports::{Change, ChangeSet, ProjectReader, UnitOfWork};

use super::super::support::{ensure_can_modify, load_project};

#[derive(Debug, Clone)]
pub struct RecalculateProjectHealthCommand {
    pub project_id: ProjectId,
}

pub struct RecalculateProjectHealthHandler {
    projects: Arc<dyn ProjectReader>,
    uow: Arc<dyn UnitOfWork>,
}

impl RecalculateProjectHealthHandler {
    pub fn new(projects: Arc<dyn ProjectReader>, uow: Arc<dyn UnitOfWork>) -> Self {
        Self { projects, uow }
    }

    pub async fn handle(
        &self,
        cmd: RecalculateProjectHealthCommand,
        metadata: CommandMetadata,
    ) -> Result<Project, CommandError> {
        let mut project = load_project(self.projects.as_ref(), cmd.project_id).await?;
        ensure_can_modify(&metadata.caller, &project)?;

        project.recalculate_health();
        self.uow
            .commit(ChangeSet::new().with(Change::UpdateProject(project.clone())))
            .await?;
        debug!(project_id = %project.id, health = %project.health, "project health recalculated");

        Ok(project)
    }
}
