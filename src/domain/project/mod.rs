//! Project domain - delivered work, its phase lifecycle and budget health.

mod aggregate;
mod errors;
mod phase;

pub use aggregate::{NewProject, Project};
pub use errors::ProjectError;
pub use phase::{ProjectHealth, ProjectPhase};
