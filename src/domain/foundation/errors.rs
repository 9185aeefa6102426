//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Coarse classification used by callers to decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    IllegalTransition,
    Forbidden,
    InvariantViolation,
    Conflict,
    Infrastructure,
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    MissingName,
    InvalidCategory,
    InvalidCost,
    InvalidRevenue,
    InvalidTargetMargin,
    InvalidCompletionPercent,
    InvalidSpend,
    ReorderCountMismatch,
    InvalidReorderList,

    // Not found errors
    DealNotFound,
    OfferNotFound,
    ProjectNotFound,
    BudgetLineNotFound,
    ParentNotFound,
    SourceLinesNotFound,

    // State errors
    InvalidStageTransition,
    InvalidPhaseTransition,
    DealNotInNegotiation,
    DealAlreadyWon,
    DealAlreadyLost,
    DealNotLost,
    DealClosed,
    DealAlreadyHasOffer,
    DealInvalidStageForOffer,
    OfferAlreadyClosed,
    OfferNotSent,
    OfferNotInDraftPhase,
    OfferNotWon,
    BudgetAlreadyInherited,

    // Invariant errors
    DraftOfferCannotHaveNumber,
    NonDraftOfferMustHaveNumber,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // Infrastructure errors
    Conflict,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// Returns the category this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            ValidationFailed | MissingName | InvalidCategory | InvalidCost | InvalidRevenue
            | InvalidTargetMargin | InvalidCompletionPercent | InvalidSpend
            | ReorderCountMismatch | InvalidReorderList => ErrorKind::InvalidInput,

            DealNotFound | OfferNotFound | ProjectNotFound | BudgetLineNotFound
            | ParentNotFound | SourceLinesNotFound => ErrorKind::NotFound,

            InvalidStageTransition | InvalidPhaseTransition | DealNotInNegotiation
            | DealAlreadyWon | DealAlreadyLost | DealNotLost | DealClosed
            | DealAlreadyHasOffer | DealInvalidStageForOffer | OfferAlreadyClosed
            | OfferNotSent | OfferNotInDraftPhase | OfferNotWon | BudgetAlreadyInherited => {
                ErrorKind::IllegalTransition
            }

            DraftOfferCannotHaveNumber | NonDraftOfferMustHaveNumber => {
                ErrorKind::InvariantViolation
            }

            Unauthorized | Forbidden => ErrorKind::Forbidden,

            Conflict => ErrorKind::Conflict,

            DatabaseError | InternalError => ErrorKind::Infrastructure,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::MissingName => "MISSING_NAME",
            ErrorCode::InvalidCategory => "INVALID_CATEGORY",
            ErrorCode::InvalidCost => "INVALID_COST",
            ErrorCode::InvalidRevenue => "INVALID_REVENUE",
            ErrorCode::InvalidTargetMargin => "INVALID_TARGET_MARGIN",
            ErrorCode::InvalidCompletionPercent => "INVALID_COMPLETION_PERCENT",
            ErrorCode::InvalidSpend => "INVALID_SPEND",
            ErrorCode::ReorderCountMismatch => "REORDER_COUNT_MISMATCH",
            ErrorCode::InvalidReorderList => "INVALID_REORDER_LIST",
            ErrorCode::DealNotFound => "DEAL_NOT_FOUND",
            ErrorCode::OfferNotFound => "OFFER_NOT_FOUND",
            ErrorCode::ProjectNotFound => "PROJECT_NOT_FOUND",
            ErrorCode::BudgetLineNotFound => "BUDGET_LINE_NOT_FOUND",
            ErrorCode::ParentNotFound => "PARENT_NOT_FOUND",
            ErrorCode::SourceLinesNotFound => "SOURCE_LINES_NOT_FOUND",
            ErrorCode::InvalidStageTransition => "INVALID_STAGE_TRANSITION",
            ErrorCode::InvalidPhaseTransition => "INVALID_PHASE_TRANSITION",
            ErrorCode::DealNotInNegotiation => "DEAL_NOT_IN_NEGOTIATION",
            ErrorCode::DealAlreadyWon => "DEAL_ALREADY_WON",
            ErrorCode::DealAlreadyLost => "DEAL_ALREADY_LOST",
            ErrorCode::DealNotLost => "DEAL_NOT_LOST",
            ErrorCode::DealClosed => "DEAL_CLOSED",
            ErrorCode::DealAlreadyHasOffer => "DEAL_ALREADY_HAS_OFFER",
            ErrorCode::DealInvalidStageForOffer => "DEAL_INVALID_STAGE_FOR_OFFER",
            ErrorCode::OfferAlreadyClosed => "OFFER_ALREADY_CLOSED",
            ErrorCode::OfferNotSent => "OFFER_NOT_SENT",
            ErrorCode::OfferNotInDraftPhase => "OFFER_NOT_IN_DRAFT_PHASE",
            ErrorCode::OfferNotWon => "OFFER_NOT_WON",
            ErrorCode::BudgetAlreadyInherited => "BUDGET_ALREADY_INHERITED",
            ErrorCode::DraftOfferCannotHaveNumber => "DRAFT_OFFER_CANNOT_HAVE_NUMBER",
            ErrorCode::NonDraftOfferMustHaveNumber => "NON_DRAFT_OFFER_MUST_HAVE_NUMBER",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Ports report infrastructure failures with this type; the bounded-context
/// error enums convert into it when a caller needs a uniform shape.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a database error wrapping the underlying cause.
    pub fn database(context: &str, cause: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", context, cause))
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}
