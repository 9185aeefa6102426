//! PostgreSQL adapters - Database implementations of the ports.
//!
//! - `PostgresStore` - readers, offer-number sequence and the transactional unit of work
//! - `PostgresActivityLog` / `PostgresNotificationSink` - post-commit side effects

mod rows;
mod sinks;
mod store;

pub use sinks::{PostgresActivityLog, PostgresNotificationSink};
pub use store::PostgresStore;
