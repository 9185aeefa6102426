//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates domain operations and coordinates between ports.

pub mod errors;
pub mod handlers;

pub use errors::CommandError;
