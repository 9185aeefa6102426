//! Budget line command and query handlers.

mod clone_budget_lines;
mod create_budget_line;
mod delete_budget_line;
mod delete_budget_lines_by_parent;
mod get_budget_summary;
mod list_budget_lines;
mod reorder_budget_lines;
mod update_budget_line;

pub use clone_budget_lines::{
    CloneBudgetLinesCommand, CloneBudgetLinesHandler, CloneBudgetLinesResult,
};
pub use create_budget_line::{
    CreateBudgetLineCommand, CreateBudgetLineHandler, CreateBudgetLineResult,
};
pub use delete_budget_line::{
    DeleteBudgetLineCommand, DeleteBudgetLineHandler, DeleteBudgetLineResult,
};
pub use delete_budget_lines_by_parent::{
    DeleteBudgetLinesByParentCommand, DeleteBudgetLinesByParentHandler,
    DeleteBudgetLinesByParentResult,
};
pub use get_budget_summary::{GetBudgetSummaryHandler, GetBudgetSummaryQuery};
pub use list_budget_lines::{ListBudgetLinesHandler, ListBudgetLinesPageQuery, ListBudgetLinesQuery};
pub use reorder_budget_lines::{ReorderBudgetLinesCommand, ReorderBudgetLinesHandler};
pub use update_budget_line::{
    UpdateBudgetLineCommand, UpdateBudgetLineHandler, UpdateBudgetLineResult,
};

use crate::application::CommandError;
use crate::domain::budget::{clone_lines, BudgetError, BudgetLine, BudgetParent, LineName};
use crate::domain::foundation::CategoryId;
use crate::ports::{BudgetCategoryReader, BudgetLineReader};

/// Resolves a category reference; inactive categories count as invalid.
pub(crate) async fn resolve_category(
    categories: &dyn BudgetCategoryReader,
    id: CategoryId,
) -> Result<LineName, CommandError> {
    match categories.find_by_id(&id).await? {
        Some(category) if category.is_active => Ok(LineName::Category {
            id,
            name: category.name,
        }),
        _ => Err(BudgetError::InvalidCategory(id).into()),
    }
}

/// Plans copies of every line of `source` appended to `target`.
///
/// Fails with `SourceLinesNotFound` when the source has no lines.
pub(crate) async fn plan_clone(
    lines: &dyn BudgetLineReader,
    source: BudgetParent,
    target: BudgetParent,
) -> Result<Vec<BudgetLine>, CommandError> {
    let source_lines = lines.list_by_parent(&source).await?;
    let existing = lines.count_by_parent(&target).await?;
    Ok(clone_lines(&source_lines, source, target, existing as usize)?)
}
