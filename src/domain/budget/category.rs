//! Budget categories referenced by line names.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CategoryId;

/// A named, reusable budget heading (e.g. "Steel", "Crane hire").
///
/// Only active categories may be referenced by new or updated lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: CategoryId,
    pub name: String,
    pub is_active: bool,
}
