//! Query handlers for listing the lines of a budget.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::budget::{BudgetLine, BudgetParent};
use crate::ports::{BudgetLineReader, OfferReader, Page, PageRequest, ProjectReader};

use super::super::support::load_parent;

/// Query for every line of a parent, in display order.
#[derive(Debug, Clone)]
pub struct ListBudgetLinesQuery {
    pub parent: BudgetParent,
}

/// Query for one page of a parent's lines.
///
/// Raw values are normalized through [`PageRequest::new`].
#[derive(Debug, Clone)]
pub struct ListBudgetLinesPageQuery {
    pub parent: BudgetParent,
    pub page: i64,
    pub page_size: i64,
}

/// Handler for both listing queries.
pub struct ListBudgetLinesHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
}

impl ListBudgetLinesHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        projects: Arc<dyn ProjectReader>,
        lines: Arc<dyn BudgetLineReader>,
    ) -> Self {
        Self {
            offers,
            projects,
            lines,
        }
    }

    pub async fn handle(&self, query: ListBudgetLinesQuery) -> Result<Vec<BudgetLine>, CommandError> {
        load_parent(self.offers.as_ref(), self.projects.as_ref(), query.parent).await?;
        Ok(self.lines.list_by_parent(&query.parent).await?)
    }

    pub async fn handle_page(
        &self,
        query: ListBudgetLinesPageQuery,
    ) -> Result<Page<BudgetLine>, CommandError> {
        load_parent(self.offers.as_ref(), self.projects.as_ref(), query.parent).await?;
        let request = PageRequest::new(query.page, query.page_size);
        Ok(self
            .lines
            .list_by_parent_paginated(&query.parent, request)
            .await?)
    }
}
