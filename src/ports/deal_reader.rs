//! Deal reader port.
//!
//! Read access to deals and their append-only stage history. Writes go
//! through [`UnitOfWork`](super::UnitOfWork) so that a deal and the history
//! entry describing its transition always commit together.

use crate::domain::deal::{Deal, StageHistoryEntry};
use crate::domain::foundation::{DealId, DomainError};
use async_trait::async_trait;

/// Reader port for deals.
#[async_trait]
pub trait DealReader: Send + Sync {
    /// Find a deal by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DomainError>;
}

/// Reader port for the stage history log.
#[async_trait]
pub trait StageHistoryReader: Send + Sync {
    /// All history entries of a deal, most recent first.
    async fn list_for_deal(&self, deal_id: &DealId) -> Result<Vec<StageHistoryEntry>, DomainError>;
}
