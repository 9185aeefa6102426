//! UpdateBudgetLineHandler - Command handler for editing a budget line.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::budget::{
    BudgetError, BudgetLine, BudgetLinePatch, BudgetSummary, LineName, NameSource,
};
use crate::domain::foundation::{BudgetLineId, CategoryId, CommandMetadata};
use crate::ports::{
    ActivityRecorder, BudgetCategoryReader, BudgetLineReader, Change, ChangeSet, OfferReader,
    ProjectReader, UnitOfWork,
};

use super::super::support::{load_parent, record_activity};
use super::resolve_category;

/// Command to edit a budget line. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateBudgetLineCommand {
    pub line_id: BudgetLineId,
    pub category_id: Option<CategoryId>,
    pub custom_name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub cost: Option<f64>,
    pub revenue: Option<f64>,
    pub margin_override: Option<bool>,
    pub target_margin_percent: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct UpdateBudgetLineResult {
    pub line: BudgetLine,
    pub summary: BudgetSummary,
}

/// Handler for editing budget lines.
pub struct UpdateBudgetLineHandler {
    offers: Arc<dyn OfferReader>,
    projects: Arc<dyn ProjectReader>,
    lines: Arc<dyn BudgetLineReader>,
    categories: Arc<dyn BudgetCategoryReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
}

impl UpdateBudgetLineHandler {
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
        cmd: UpdateBudgetLineCommand,
        metadata: CommandMetadata,
    ) -> Result<UpdateBudgetLineResult, CommandError> {
        // 1. Load line and authorize against its parent
        let mut line = self
            .lines
            .find_by_id(&cmd.line_id)
            .await?
            .ok_or(BudgetError::LineNotFound(cmd.line_id))?;
        let parent = load_parent(self.offers.as_ref(), self.projects.as_ref(), line.parent).await?;
        parent.ensure_can_modify(&metadata.caller)?;

        // 2. Resolve a renamed line
        let name = if cmd.category_id.is_some() || cmd.custom_name.is_some() {
            Some(match NameSource::from_parts(cmd.category_id, cmd.custom_name)? {
                NameSource::Category(id) => resolve_category(self.categories.as_ref(), id).await?,
                NameSource::Custom(name) => LineName::custom(name),
            })
        } else {
            None
        };

        // 3. Apply the patch; pricing is re-validated as a whole
        line.apply(BudgetLinePatch {
            name,
            description: cmd.description,
            quantity: cmd.quantity,
            unit: cmd.unit,
            cost: cmd.cost,
            revenue: cmd.revenue,
            margin_override: cmd.margin_override,
            target_margin_percent: cmd.target_margin_percent,
        })?;

        // 4. Persist with the parent aggregate
        let outcome = self
            .uow
            .commit(
                ChangeSet::new()
                    .with(Change::UpdateBudgetLine(line.clone()))
                    .with(Change::RecomputeParentAggregate(line.parent)),
            )
            .await?;
        let summary = outcome.summary_for(&line.parent).copied().unwrap_or_default();
        debug!(line_id = %line.id, "budget line updated");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                line.parent,
                "Budget line updated",
                format!(
                    "Updated budget line: {} (Cost: {:.2}, Revenue: {:.2})",
                    line.name.as_str(),
                    line.cost,
                    line.revenue
                ),
                &metadata.caller,
            ),
        )
        .await;

        Ok(UpdateBudgetLineResult { line, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, stranger, Fixture};
    use crate::domain::budget::BudgetParent;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::project::ProjectPhase;

    fn handler(f: &Fixture) -> UpdateBudgetLineHandler {
        UpdateBudgetLineHandler::new(
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.activities.clone(),
        )
    }

    #[tokio::test]
    async fn updates_revenue_and_resyncs_project() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Active, 0.0);
        let parent = BudgetParent::Project(project.id);
        let line = f.line(parent, "Roofing", 50.0, 60.0);
        f.line(parent, "Scaffolding", 10.0, 40.0);

        let result = handler(&f)
            .handle(
                UpdateBudgetLineCommand {
                    line_id: line.id,
                    revenue: Some(160.0),
                    ..Default::default()
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        assert_eq!(result.line.revenue, 160.0);
        assert_eq!(result.summary.total_revenue, 200.0);
        assert_eq!(f.store.project(&project.id).unwrap().value, 200.0);
        assert_eq!(f.activities.titles(), vec!["Budget line updated".to_string()]);
    }

    #[tokio::test]
    async fn switching_on_margin_override_derives_revenue() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Planning, 0.0);
        let line = f.line(BudgetParent::Project(project.id), "Roofing", 100_000.0, 1.0);

        let result = handler(&f)
            .handle(
                UpdateBudgetLineCommand {
                    line_id: line.id,
                    margin_override: Some(true),
                    target_margin_percent: Some(20.0),
                    ..Default::default()
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        assert!((result.line.revenue - 125_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn invalid_margin_leaves_line_untouched() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Planning, 0.0);
        let parent = BudgetParent::Project(project.id);
        let line = f.line(parent, "Roofing", 100.0, 150.0);

        let err = handler(&f)
            .handle(
                UpdateBudgetLineCommand {
                    line_id: line.id,
                    margin_override: Some(true),
                    target_margin_percent: Some(100.0),
                    ..Default::default()
                },
                metadata(owner()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidTargetMargin);
        assert_eq!(f.store.lines_of(&parent)[0].revenue, 150.0);
    }

    #[tokio::test]
    async fn renames_to_custom_name() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Planning, 0.0);
        let line = f.line(BudgetParent::Project(project.id), "Roofing", 1.0, 1.0);

        let result = handler(&f)
            .handle(
                UpdateBudgetLineCommand {
                    line_id: line.id,
                    custom_name: Some("Roof membrane".to_string()),
                    ..Default::default()
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        assert_eq!(result.line.name.as_str(), "Roof membrane");
    }

    #[tokio::test]
    async fn missing_line_is_not_found() {
        let f = Fixture::new();
        let err = handler(&f)
            .handle(
                UpdateBudgetLineCommand {
                    line_id: BudgetLineId::new(),
                    cost: Some(5.0),
                    ..Default::default()
                },
                metadata(owner()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::BudgetLineNotFound);
    }

    #[tokio::test]
    async fn stranger_cannot_update() {
        let f = Fixture::new();
        let project = f.project(ProjectPhase::Planning, 0.0);
        let line = f.line(BudgetParent::Project(project.id), "Roofing", 1.0, 1.0);

        let err = handler(&f)
            .handle(
                UpdateBudgetLineCommand {
                    line_id: line.id,
                    cost: Some(5.0),
                    ..Default::default()
                },
                metadata(stranger()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Forbidden(_)));
    }
}
