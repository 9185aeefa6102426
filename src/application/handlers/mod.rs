//! Command and query handlers.
//!
//! Each handler owns the ports it needs as `Arc<dyn Port>` and exposes a
//! single `handle` method. Writes go through one `UnitOfWork::commit`;
//! activity and notification side effects follow the commit and never
//! fail the command.

pub mod budget;
pub mod deal;
pub mod offer;
pub mod project;

mod support;

#[cfg(test)]
pub(crate) mod fixtures;
