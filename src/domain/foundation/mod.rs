//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, company identity, the caller model and the
//! error vocabulary used by every bounded context.

mod authorization;
mod command;
mod company;
mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use authorization::{can_modify, Caller, Modifiable, Role};
pub use command::CommandMetadata;
pub use company::{company_prefix, CompanyId, DEFAULT_COMPANY_PREFIX};
pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError};
pub use ids::{
    BudgetLineId, CategoryId, CustomerId, DealId, OfferId, ProjectId, StageHistoryId, UserId,
};
pub use money::{margin_percent, revenue_for_margin};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
