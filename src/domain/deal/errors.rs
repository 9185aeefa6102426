//! Deal pipeline error types.

use thiserror::Error;

use crate::domain::foundation::{DealId, DomainError, ErrorCode, ErrorKind, ValidationError};

use super::DealStage;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DealError {
    #[error("deal {0} not found")]
    NotFound(DealId),

    #[error("invalid stage transition from {from} to {to}")]
    InvalidStageTransition { from: DealStage, to: DealStage },

    #[error("deal must be in negotiation stage to be won (currently {0})")]
    NotInNegotiation(DealStage),

    #[error("cannot mark a won deal as lost")]
    AlreadyWon,

    #[error("deal is already marked as lost")]
    AlreadyLost,

    #[error("only lost deals can be reopened")]
    NotLost,

    #[error("deal is closed ({0}) and cannot be edited")]
    Closed(DealStage),

    #[error("deal already has a linked offer")]
    AlreadyHasOffer,

    #[error("deal must be in lead or qualified stage to create an offer (currently {0})")]
    InvalidStageForOffer(DealStage),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DealError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DealError::NotFound(_) => ErrorCode::DealNotFound,
            DealError::InvalidStageTransition { .. } => ErrorCode::InvalidStageTransition,
            DealError::NotInNegotiation(_) => ErrorCode::DealNotInNegotiation,
            DealError::AlreadyWon => ErrorCode::DealAlreadyWon,
            DealError::AlreadyLost => ErrorCode::DealAlreadyLost,
            DealError::NotLost => ErrorCode::DealNotLost,
            DealError::Closed(_) => ErrorCode::DealClosed,
            DealError::AlreadyHasOffer => ErrorCode::DealAlreadyHasOffer,
            DealError::InvalidStageForOffer(_) => ErrorCode::DealInvalidStageForOffer,
            DealError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DealError> for DomainError {
    fn from(err: DealError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
