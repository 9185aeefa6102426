//! Budget line error types.

use thiserror::Error;

use crate::domain::foundation::{BudgetLineId, CategoryId, DomainError, ErrorCode, ErrorKind};

use super::BudgetParent;

/// Errors raised by budget line operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BudgetError {
    #[error("parent entity {0} not found")]
    ParentNotFound(BudgetParent),

    #[error("budget line {0} not found")]
    LineNotFound(BudgetLineId),

    #[error("exactly one of categoryId or customName must be provided")]
    MissingName,

    #[error("category {0} not found or inactive")]
    InvalidCategory(CategoryId),

    #[error("cost must be greater than 0")]
    InvalidCost,

    #[error("revenue must be greater than or equal to 0")]
    InvalidRevenue,

    #[error("target margin percent must be between 0 and 100: {0}")]
    InvalidTargetMargin(String),

    #[error("reorder list does not match current line count: got {actual}, expected {expected}")]
    ReorderCountMismatch { expected: usize, actual: usize },

    #[error("budget line {0} is missing from or repeated in the reorder list")]
    InvalidReorderList(BudgetLineId),

    #[error("no budget lines found on {0}")]
    SourceLinesNotFound(BudgetParent),
}

impl BudgetError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BudgetError::ParentNotFound(_) => ErrorCode::ParentNotFound,
            BudgetError::LineNotFound(_) => ErrorCode::BudgetLineNotFound,
            BudgetError::MissingName => ErrorCode::MissingName,
            BudgetError::InvalidCategory(_) => ErrorCode::InvalidCategory,
            BudgetError::InvalidCost => ErrorCode::InvalidCost,
            BudgetError::InvalidRevenue => ErrorCode::InvalidRevenue,
            BudgetError::InvalidTargetMargin(_) => ErrorCode::InvalidTargetMargin,
            BudgetError::ReorderCountMismatch { .. } => ErrorCode::ReorderCountMismatch,
            BudgetError::InvalidReorderList(_) => ErrorCode::InvalidReorderList,
            BudgetError::SourceLinesNotFound(_) => ErrorCode::SourceLinesNotFound,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<BudgetError> for DomainError {
    fn from(err: BudgetError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_mismatch_reports_both_counts() {
        let err = BudgetError::ReorderCountMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("got 2, expected 3"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn parent_not_found_is_not_found_kind() {
        let err = BudgetError::ParentNotFound(BudgetParent::Offer(Default::default()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
