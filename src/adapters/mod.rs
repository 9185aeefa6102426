//! Adapters - Implementations of port interfaces.
//!
//! - `http` - axum REST surface over the application handlers
//! - `memory` - in-process store and sinks for tests and local runs
//! - `postgres` - sqlx-backed store and sinks

pub mod http;
pub mod memory;
pub mod postgres;
