//! Project reader port.

use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::project::Project;
use async_trait::async_trait;

/// Reader port for projects.
#[async_trait]
pub trait ProjectReader: Send + Sync {
    /// Find a project by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError>;
}
