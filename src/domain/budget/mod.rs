//! Budget domain - line items on offers and projects, and their aggregate.

mod category;
mod errors;
mod line;
mod ordering;
mod parent;
mod summary;

pub use category::BudgetCategory;
pub use errors::BudgetError;
pub use line::{BudgetLine, BudgetLinePatch, LineDetails, LineName, NameSource, Pricing};
pub use ordering::{clone_lines, validate_reorder};
pub use parent::{BudgetParent, BudgetParentKind};
pub use summary::BudgetSummary;
