//! Command infrastructure for application handlers.
//!
//! Every handler takes its command plus a `CommandMetadata` carrying the
//! resolved caller, so authorization and audit attribution read the same
//! fields everywhere.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Caller;

/// Metadata context for command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Who is executing this command.
    pub caller: Caller,

    /// Links related operations across a single request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandMetadata {
    pub fn new(caller: Caller) -> Self {
        Self {
            caller,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Returns the correlation ID, generating one if absent.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CompanyId, Role, UserId};

    fn caller() -> Caller {
        Caller::new(
            UserId::new("user-1").unwrap(),
            vec![Role::Market],
            CompanyId::new("tak").unwrap(),
        )
    }

    #[test]
    fn keeps_supplied_correlation_id() {
        let meta = CommandMetadata::new(caller()).with_correlation_id("req-42");
        assert_eq!(meta.correlation_id(), "req-42");
    }

    #[test]
    fn generates_correlation_id_when_missing() {
        let meta = CommandMetadata::new(caller());
        assert!(Uuid::parse_str(&meta.correlation_id()).is_ok());
    }
}
