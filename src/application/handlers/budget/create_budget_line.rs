//! CreateBudgetLineHandler - Command handler for adding a line to a budget.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{
    BudgetLine, BudgetParent, BudgetSummary, LineDetails, LineName, NameSource, Pricing,
};
use crate::domain::foundation::{CategoryId, CommandMetadata};
use crate::ports::{
    ActivityRecorder, BudgetCategoryReader, BudgetLineReader, Change, ChangeSet, OfferReader,
    ProjectReader, UnitOfWork,
};

use super::super::support::{load_parent, record_activity};
use super::resolve_category;

/// Command to add a budget line to an offer or project.
#[derive(Debug, Clone)]
pub struct CreateBudgetLineCommand {
    pub parent: BudgetParent,
    pub category_id: Option<CategoryId>,
    pub custom_name: Option<String>,
    pub details: LineDetails,
    pub cost: f64,
    pub revenue: f64,
    pub margin_override: bool,
    pub target_margin_percent: Option<f64>,
    /// Defaults to the current number of lines on the parent.
    pub display_order: Option<u32>,
}

/// Result of a successful line creation.
#[derive(Debug, Clone)]
pub struct CreateBudgetLineResult {
    pub line: BudgetLine,
    pub summary: BudgetSummary,
}

/// Handler for adding budget lines.
pub struct CreateBudgetLineHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
    categories: Arc<dyn BudgetCategoryReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl CreateBudgetLineHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        projects: Arc<dyn ProjectReader>,
        lines: Arc<dyn BudgetLineReader>,
        categories: Arc<dyn BudgetCategoryReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
    ) -> Self {
        Self {
            offers,
            projects,
            lines,
            categories,
            uow,
            activities,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateBudgetLineCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateBudgetLineResult, CommandError> {
        // 1. Parent must exist and be modifiable by the caller
        let parent = load_parent(self.offers.as_ref(), self.projects.as_ref(), cmd.parent).await?;
        parent.ensure_can_modify(&metadata.caller)?;

        // 2. Resolve the name
        let name = match NameSource::from_parts(cmd.category_id, cmd.custom_name)? {
            NameSource::Category(id) => resolve_category(self.categories.as_ref(), id).await?,
            NameSource::Custom(name) => LineName::custom(name),
        };

        // 3. Build the line
        let display_order = match cmd.display_order {
            Some(order) => order,
            None => self.lines.count_by_parent(&cmd.parent).await?,
        };
        let pricing = Pricing {
            cost: cmd.cost,
            revenue: cmd.revenue,
            margin_override: cmd.margin_override,
            target_margin_percent: cmd.target_margin_percent,
        };
        let line = BudgetLine::create(cmd.parent, name, cmd.details, pricing, display_order)?;

        // 4. Persist together with the parent aggregate
        let outcome = self
            .uow
            .commit(
                ChangeSet::new()
                    .with(Change::InsertBudgetLine(line.clone()))
                    .with(Change::RecomputeParentAggregate(cmd.parent)),
            )
            .await?;
        let summary = outcome.summary_for(&cmd.parent).copied().unwrap_or_default();
        debug!(line_id = %line.id, parent = %cmd.parent, "budget line created");

        // 5. Activity
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                cmd.parent,
                "Budget line added",
                format!(
                    "Added budget line: {} (Cost: {:.2}, Revenue: {:.2})",
                    line.name.as_str(),
                    line.cost,
                    line.revenue
                ),
                &metadata.caller,
            ),
        )
        .await;

        Ok(CreateBudgetLineResult { line, summary })
    }
}
