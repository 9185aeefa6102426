//! In-memory adapters.
//!
//! Used by the test suites and for running the service without a database.

mod sinks;
mod store;

pub use sinks::{InMemoryActivityLog, InMemoryNotificationSink};
pub use store::InMemoryStore;
