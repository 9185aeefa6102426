//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement these
//! ports.
//!
//! ## Read Ports
//!
//! - `DealReader`, `StageHistoryReader` - deals and their transition log
//! - `OfferReader`, `ProjectReader` - offers and projects by id
//! - `BudgetLineReader` - ordered and paginated budget lines per parent
//! - `BudgetCategoryReader` - category reference data
//!
//! ## Write Ports
//!
//! - `UnitOfWork` - atomic commit of a `ChangeSet`
//! - `NumberSequence` - per-company, per-year offer number counter
//!
//! ## Side-Effect Ports
//!
//! - `ActivityRecorder` - activity log, written after commit
//! - `NotificationSink` - user notifications, written after commit

mod activity_recorder;
mod budget_category_reader;
mod budget_line_reader;
mod deal_reader;
mod number_sequence;
mod offer_reader;
mod project_reader;
mod unit_of_work;

pub use activity_recorder::{ActivityRecorder, NotificationSink};
pub use budget_category_reader::BudgetCategoryReader;
pub use budget_line_reader::{BudgetLineReader, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use deal_reader::{DealReader, StageHistoryReader};
pub use number_sequence::NumberSequence;
pub use offer_reader::OfferReader;
pub use project_reader::ProjectReader;
pub use unit_of_work::{Change, ChangeSet, CommitOutcome, UnitOfWork};
