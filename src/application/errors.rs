//! Error type returned by every command handler.

use thiserror::Error;

use crate::domain::budget::BudgetError;
use crate::domain::deal::DealError;
use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, ValidationError};
use crate::domain::offer::OfferError;
use crate::domain::project::ProjectError;

/// Errors that can occur while handling a command.
///
/// Conversions touch several contexts at once, so the context errors are
/// wrapped rather than flattened; `?` composes across all of them.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error(transparent)]
    Deal(#[from] DealError),

    #[error(transparent)]
    Offer(#[from] OfferError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Infrastructure(#[from] DomainError),
}

impl CommandError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CommandError::Budget(e) => e.code(),
            CommandError::Deal(e) => e.code(),
            CommandError::Offer(e) => e.code(),
            CommandError::Project(e) => e.code(),
            CommandError::Validation(_) => ErrorCode::ValidationFailed,
            CommandError::Forbidden(_) => ErrorCode::Forbidden,
            CommandError::Infrastructure(e) => e.code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deal::DealStage;
    use crate::domain::foundation::OfferId;

    #[test]
    fn context_errors_keep_their_codes() {
        let err: CommandError = DealError::InvalidStageTransition {
            from: DealStage::Proposal,
            to: DealStage::Won,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::InvalidStageTransition);
        assert_eq!(err.kind(), ErrorKind::IllegalTransition);

        let err: CommandError = OfferError::NotFound(OfferId::new()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn forbidden_maps_to_forbidden_kind() {
        let err = CommandError::Forbidden("nope".to_string());
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_string(), "forbidden: nope");
    }

    #[test]
    fn infrastructure_reports_inner_code() {
        let err: CommandError = DomainError::database("Failed to commit", "timeout").into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
    }
}
