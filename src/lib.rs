//! Relation API - CRM backend for a group of construction companies.
//!
//! Tracks the sales pipeline from first lead to delivered project:
//!
//! - **Deals** move through `lead -> qualified -> proposal -> negotiation`
//!   and close as won or lost, with every stage change recorded.
//! - **Offers** carry a company-scoped number (`ST-2025-001`) once they
//!   leave draft, and convert into a project when accepted.
//! - **Projects** track phase, completion and spend, with a health status
//!   derived from budget consumption.
//! - **Budget lines** hang off an offer or a project; their totals and
//!   margins are rolled up into the parent in the same transaction.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
