//! GetProjectHandler - Query handler for a single project.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::foundation::ProjectId;
use crate::domain::project::Project;
use crate::ports::ProjectReader;

use super::super::support::load_project;

#[derive(Debug, Clone)]
pub struct GetProjectQuery {
    pub project_id: ProjectId,
}

pub struct GetProjectHandler {
    projects: Arc<dyn ProjectReader>,
}

impl GetProjectHandler {
    pub fn new(projects: Arc<dyn ProjectReader>) -> Self {
        Self { projects }
    }

    pub async fn handle(&self, query: GetProjectQuery) -> Result<Project, CommandError> {
        load_project(self.projects.as_ref(), query.project_id).await
    }
}
