//! Offer lifecycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Phase of an offer.
///
/// ```text
/// draft <-> in_progress -> sent -> won
///   |            |          |  \-> lost
///   \------------\----------\----> expired
/// ```
///
/// `won`, `lost` and `expired` are closed; nothing leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferPhase {
    Draft,
    InProgress,
    Sent,
    Won,
    Lost,
    Expired,
}

impl OfferPhase {
    pub fn is_closed(&self) -> bool {
        matches!(self, OfferPhase::Won | OfferPhase::Lost | OfferPhase::Expired)
    }

    /// Probability implied by the phase; `None` leaves the caller's value.
    pub fn implied_probability(&self) -> Option<u8> {
        match self {
            OfferPhase::Sent => Some(50),
            OfferPhase::Won => Some(100),
            OfferPhase::Lost => Some(0),
            OfferPhase::Draft | OfferPhase::InProgress | OfferPhase::Expired => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferPhase::Draft => "draft",
            OfferPhase::InProgress => "in_progress",
            OfferPhase::Sent => "sent",
            OfferPhase::Won => "won",
            OfferPhase::Lost => "lost",
            OfferPhase::Expired => "expired",
        }
    }
}

impl StateMachine for OfferPhase {
    fn valid_transitions(&self) -> Vec<Self> {
        use OfferPhase::*;
        match self {
            Draft => vec![InProgress, Sent, Expired],
            InProgress => vec![Draft, Sent, Expired],
            Sent => vec![InProgress, Won, Lost, Expired],
            Won | Lost | Expired => vec![],
        }
    }
}

impl fmt::Display for OfferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OfferPhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(OfferPhase::Draft),
            "in_progress" => Ok(OfferPhase::InProgress),
            "sent" => Ok(OfferPhase::Sent),
            "won" => Ok(OfferPhase::Won),
            "lost" => Ok(OfferPhase::Lost),
            "expired" => Ok(OfferPhase::Expired),
            other => Err(ValidationError::invalid_format(
                "phase",
                format!("unknown offer phase '{}'", other),
            )),
        }
    }
}
