//! Budget category lookup port.
//!
//! Categories are reference data maintained outside this service; the core
//! only needs to resolve one by id when a line names it.

use crate::domain::budget::BudgetCategory;
use crate::domain::foundation::{CategoryId, DomainError};
use async_trait::async_trait;

#[async_trait]
pub trait BudgetCategoryReader: Send + Sync {
    /// Find a category by id, active or not.
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<BudgetCategory>, DomainError>;
}
