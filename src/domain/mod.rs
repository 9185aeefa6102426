//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, caller model, errors)
//! - `budget` - Budget lines, their validation and per-parent aggregate
//! - `deal` - Sales pipeline stage machine and stage history
//! - `offer` - Offer phase lifecycle and offer numbering
//! - `project` - Project phases, completion and budget health
//! - `activity` - Activity and notification records produced by transitions

pub mod activity;
pub mod budget;
pub mod deal;
pub mod foundation;
pub mod offer;
pub mod project;
