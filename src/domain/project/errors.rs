//! Project lifecycle error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, OfferId, ProjectId, ValidationError};
use crate::domain::offer::OfferPhase;

use super::ProjectPhase;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    #[error("project {0} not found")]
    NotFound(ProjectId),

    #[error("invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: ProjectPhase, to: ProjectPhase },

    #[error("completion percent must be between 0 and 100, got {0}")]
    InvalidCompletionPercent(f64),

    #[error("spent amount must be zero or positive, got {0}")]
    InvalidSpend(f64),

    #[error("offer must be won before its budget can be inherited (currently {0})")]
    OfferNotWon(OfferPhase),

    #[error("project already inherited its budget from offer {0}")]
    BudgetAlreadyInherited(OfferId),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ProjectError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProjectError::NotFound(_) => ErrorCode::ProjectNotFound,
            ProjectError::InvalidPhaseTransition { .. } => ErrorCode::InvalidPhaseTransition,
            ProjectError::InvalidCompletionPercent(_) => ErrorCode::InvalidCompletionPercent,
            ProjectError::InvalidSpend(_) => ErrorCode::InvalidSpend,
            ProjectError::OfferNotWon(_) => ErrorCode::OfferNotWon,
            ProjectError::BudgetAlreadyInherited(_) => ErrorCode::BudgetAlreadyInherited,
            ProjectError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<ProjectError> for DomainError {
    fn from(err: ProjectError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
