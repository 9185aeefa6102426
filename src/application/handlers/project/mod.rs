//! Project command and query handlers.

mod create_project;
mod get_project;
mod inherit_project_budget;
mod recalculate_project_health;
mod record_project_spend;
mod update_project_completion;
mod update_project_phase;

pub use create_project::{CreateProjectCommand, CreateProjectHandler};
pub use get_project::{GetProjectHandler, GetProjectQuery};
pub use inherit_project_budget::{
    InheritProjectBudgetCommand, InheritProjectBudgetHandler, InheritProjectBudgetResult,
};
pub use recalculate_project_health::{
    RecalculateProjectHealthCommand, RecalculateProjectHealthHandler,
};
pub use record_project_spend::{RecordProjectSpendCommand, RecordProjectSpendHandler};
pub use update_project_completion::{
    UpdateProjectCompletionCommand, UpdateProjectCompletionHandler, UpdateProjectCompletionResult,
};
pub use update_project_phase::{UpdateProjectPhaseCommand, UpdateProjectPhaseHandler};
