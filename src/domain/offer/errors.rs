//! Offer lifecycle error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, OfferId, ValidationError};

use super::OfferPhase;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OfferError {
    #[error("offer {0} not found")]
    NotFound(OfferId),

    #[error("offer is already in a closed state (won/lost/expired)")]
    AlreadyClosed,

    #[error("offer must be in sent phase (currently {0})")]
    NotSent(OfferPhase),

    #[error("offer must be in draft or in_progress phase to be sent (currently {0})")]
    NotInDraftPhase(OfferPhase),

    #[error("offer must be won (currently {0})")]
    NotWon(OfferPhase),

    #[error("invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: OfferPhase, to: OfferPhase },

    #[error("draft offers cannot have an offer number")]
    DraftCannotHaveNumber,

    #[error("non-draft offers must have an offer number")]
    NonDraftMustHaveNumber,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl OfferError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OfferError::NotFound(_) => ErrorCode::OfferNotFound,
            OfferError::AlreadyClosed => ErrorCode::OfferAlreadyClosed,
            OfferError::NotSent(_) => ErrorCode::OfferNotSent,
            OfferError::NotInDraftPhase(_) => ErrorCode::OfferNotInDraftPhase,
            OfferError::NotWon(_) => ErrorCode::OfferNotWon,
            OfferError::InvalidPhaseTransition { .. } => ErrorCode::InvalidPhaseTransition,
            OfferError::DraftCannotHaveNumber => ErrorCode::DraftOfferCannotHaveNumber,
            OfferError::NonDraftMustHaveNumber => ErrorCode::NonDraftOfferMustHaveNumber,
            OfferError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<OfferError> for DomainError {
    fn from(err: OfferError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
