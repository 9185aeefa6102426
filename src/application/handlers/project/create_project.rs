//! CreateProjectHandler - Command handler for manually created projects.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::foundation::{CommandMetadata, CompanyId, CustomerId, Timestamp, UserId};
use crate::domain::project::{NewProject, Project, ProjectPhase};
use crate::ports::{ActivityRecorder, Change, ChangeSet, UnitOfWork};

use super::super::support::record_activity;

#[derive(Debug, Clone)]
pub struct CreateProjectCommand {
    pub name: String,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    /// Defaults to the caller's company.
    pub company_id: Option<CompanyId>,
    /// Defaults to planning.
    pub phase: Option<ProjectPhase>,
    pub value: f64,
    /// Defaults to the caller.
    pub manager_id: Option<UserId>,
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

pub struct CreateProjectHandler {
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl CreateProjectHandler {
    pub fn new(uow: Arc<dyn UnitOfWork>, activities: Arc<dyn ActivityRecorder>) -> Self {
        Self { uow, activities }
    }

    pub async fn handle(
        &self,
        cmd: CreateProjectCommand,
        metadata: CommandMetadata,
    ) -> Result<Project, CommandError> {
        let caller = &metadata.caller;

        let company_id = cmd.company_id.unwrap_or_else(|| caller.company_id.clone());
        if !caller.can_access_company(&company_id) {
            return Err(CommandError::Forbidden(format!(
                "user {} may not create projects for company {}",
                caller.user_id, company_id
            )));
        }

        let project = Project::create(
            NewProject {
                name: cmd.name,
                customer_id: cmd.customer_id,
                customer_name: cmd.customer_name,
                company_id,
                phase: cmd.phase,
                value: cmd.value,
                manager_id: cmd.manager_id.or_else(|| Some(caller.user_id.clone())),
                description: cmd.description,
                start_date: cmd.start_date,
                end_date: cmd.end_date,
            },
            caller,
        )?;

        self.uow
            .commit(ChangeSet::new().with(Change::InsertProject(project.clone())))
            .await?;
        debug!(project_id = %project.id, "project created");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                project.id,
                "Project created",
                format!("Project '{}' was created", project.name),
                caller,
            ),
        )
        .await;

        Ok(project)
    }
}
