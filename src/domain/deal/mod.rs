//! Deal domain - the sales pipeline state machine.

mod aggregate;
mod errors;
mod history;
mod stage;

pub use aggregate::{Deal, DealPatch, NewDeal};
pub use errors::DealError;
pub use history::{newest_first, StageHistoryEntry};
pub use stage::{DealStage, LossReasonCategory};
