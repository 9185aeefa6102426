//! Offer number sequence port.
//!
//! Issues the running counter behind offer numbers. The counter is shared
//! by every offer of a company within one calendar year, so implementations
//! must make `next_value` atomic across concurrent callers.

use crate::domain::foundation::{CompanyId, DomainError};
use async_trait::async_trait;

#[async_trait]
pub trait NumberSequence: Send + Sync {
    /// Returns the next counter value for `company` in `year`, starting at 1.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` when the counter cannot be advanced
    async fn next_value(&self, company: &CompanyId, year: i32) -> Result<u32, DomainError>;
}
