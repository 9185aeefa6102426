//! Deal pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Stage of a deal in the sales pipeline.
///
/// ```text
/// lead -> qualified -> proposal -> negotiation -> won
///   \________\___________\____________\--------> lost -> (reopen) lead
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    /// Probability assigned when a deal enters this stage.
    pub fn default_probability(&self) -> u8 {
        match self {
            DealStage::Lead => 10,
            DealStage::Qualified => 25,
            DealStage::Proposal => 50,
            DealStage::Negotiation => 75,
            DealStage::Won => 100,
            DealStage::Lost => 0,
        }
    }

    /// Won and lost deals are closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::Won | DealStage::Lost)
    }

    /// Stages from which an offer may still be drafted.
    pub fn accepts_new_offer(&self) -> bool {
        matches!(self, DealStage::Lead | DealStage::Qualified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Lead => "lead",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::Won => "won",
            DealStage::Lost => "lost",
        }
    }
}

impl StateMachine for DealStage {
    fn valid_transitions(&self) -> Vec<Self> {
        use DealStage::*;
        match self {
            Lead => vec![Qualified, Lost],
            Qualified => vec![Proposal, Lost],
            Proposal => vec![Negotiation, Lost],
            Negotiation => vec![Won, Lost],
            Won => vec![],
            Lost => vec![Lead],
        }
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DealStage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(DealStage::Lead),
            "qualified" => Ok(DealStage::Qualified),
            "proposal" => Ok(DealStage::Proposal),
            "negotiation" => Ok(DealStage::Negotiation),
            "won" => Ok(DealStage::Won),
            "lost" => Ok(DealStage::Lost),
            other => Err(ValidationError::invalid_format(
                "stage",
                format!("unknown deal stage '{}'", other),
            )),
        }
    }
}

/// Categorized reason for losing a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReasonCategory {
    Price,
    Timing,
    Competitor,
    Requirements,
    Other,
}

impl LossReasonCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossReasonCategory::Price => "price",
            LossReasonCategory::Timing => "timing",
            LossReasonCategory::Competitor => "competitor",
            LossReasonCategory::Requirements => "requirements",
            LossReasonCategory::Other => "other",
        }
    }
}

impl fmt::Display for LossReasonCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LossReasonCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(LossReasonCategory::Price),
            "timing" => Ok(LossReasonCategory::Timing),
            "competitor" => Ok(LossReasonCategory::Competitor),
            "requirements" => Ok(LossReasonCategory::Requirements),
            "other" => Ok(LossReasonCategory::Other),
            other => Err(ValidationError::invalid_format(
                "loss_reason_category",
                format!("unknown loss reason '{}'", other),
            )),
        }
    }
}
