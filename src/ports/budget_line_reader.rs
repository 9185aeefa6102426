//! Budget line reader port.
//!
//! Lines are always returned in display order. Pagination requests are
//! normalized before they reach an adapter, so implementations can trust
//! `page >= 1` and `1 <= page_size <= MAX_PAGE_SIZE`.

use crate::domain::budget::{BudgetLine, BudgetParent};
use crate::domain::foundation::{BudgetLineId, DomainError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Reader port for budget lines.
#[async_trait]
pub trait BudgetLineReader: Send + Sync {
    /// Find a single line by id.
    async fn find_by_id(&self, id: &BudgetLineId) -> Result<Option<BudgetLine>, DomainError>;

    /// Every line of `parent`, ordered by display order.
    async fn list_by_parent(&self, parent: &BudgetParent) -> Result<Vec<BudgetLine>, DomainError>;

    /// One page of the lines of `parent`, ordered by display order.
    async fn list_by_parent_paginated(
        &self,
        parent: &BudgetParent,
        request: PageRequest,
    ) -> Result<Page<BudgetLine>, DomainError>;

    /// Number of lines under `parent`.
    async fn count_by_parent(&self, parent: &BudgetParent) -> Result<u32, DomainError>;
}

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Clamps raw input: page below 1 becomes 1, size below 1 becomes
    /// [`DEFAULT_PAGE_SIZE`], size above [`MAX_PAGE_SIZE`] is capped.
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = if page < 1 { 1 } else { page.min(u32::MAX as i64) as u32 };
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE as i64) as u32
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE as i64)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let size = u64::from(request.page_size());
        let total_pages = ((total + size - 1) / size) as u32;
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
            total_pages,
        }
    }
}
