//! GetBudgetSummaryHandler - Query handler for a parent's budget totals.

use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::budget::{BudgetParent, BudgetSummary};
use crate::ports::{BudgetLineReader, OfferReader, ProjectReader};

use super::super::support::load_parent;

#[derive(Debug, Clone)]
pub struct GetBudgetSummaryQuery {
    pub parent: BudgetParent,
}

/// Summarizes the lines as currently stored; never reads cached totals.
pub struct GetBudgetSummaryHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
}

impl GetBudgetSummaryHandler {
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

    pub async fn handle(&self, query: GetBudgetSummaryQuery) -> Result<BudgetSummary, CommandError> {
        load_parent(self.offers.as_ref(), self.projects.as_ref(), query.parent).await?;
        let lines = self.lines.list_by_parent(&query.parent).await?;
        Ok(BudgetSummary::from_lines(&lines))
    }
}
