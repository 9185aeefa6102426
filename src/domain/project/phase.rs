//! Project phases and budget health.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle phase of a project.
///
/// Any open phase may move to any other phase; `completed` and
/// `cancelled` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPhase {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectPhase {
    const ALL: [ProjectPhase; 5] = [
        ProjectPhase::Planning,
        ProjectPhase::Active,
        ProjectPhase::OnHold,
        ProjectPhase::Completed,
        ProjectPhase::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectPhase::Planning => "planning",
            ProjectPhase::Active => "active",
            ProjectPhase::OnHold => "on_hold",
            ProjectPhase::Completed => "completed",
            ProjectPhase::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for ProjectPhase {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ProjectPhase::Completed | ProjectPhase::Cancelled => vec![],
            current => Self::ALL
                .iter()
                .copied()
                .filter(|phase| phase != current)
                .collect(),
        }
    }
}

impl fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectPhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("phase", format!("unknown project phase '{}'", s))
            })
    }
}

/// Budget health derived from spend against budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectHealth {
    OnTrack,
    AtRisk,
    OverBudget,
}

impl ProjectHealth {
    /// Upper bound (inclusive) of spend/budget percentage still on track.
    pub const ON_TRACK_LIMIT: f64 = 110.0;
    /// Upper bound (inclusive) of spend/budget percentage still at risk.
    pub const AT_RISK_LIMIT: f64 = 120.0;

    /// Classifies `spent / budget * 100`. A zero budget counts as 0%.
    ///
    /// Compared as `spent * 100` against `budget * limit` so that exact
    /// boundaries such as 110% do not drift through the division.
    pub fn classify(spent: f64, budget: f64) -> Self {
        if budget == 0.0 {
            return ProjectHealth::OnTrack;
        }
        let scaled = spent * 100.0;
        if scaled <= budget * Self::ON_TRACK_LIMIT {
            ProjectHealth::OnTrack
        } else if scaled <= budget * Self::AT_RISK_LIMIT {
            ProjectHealth::AtRisk
        } else {
            ProjectHealth::OverBudget
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectHealth::OnTrack => "on_track",
            ProjectHealth::AtRisk => "at_risk",
            ProjectHealth::OverBudget => "over_budget",
        }
    }
}

impl fmt::Display for ProjectHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectHealth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_track" => Ok(ProjectHealth::OnTrack),
            "at_risk" => Ok(ProjectHealth::AtRisk),
            "over_budget" => Ok(ProjectHealth::OverBudget),
            other => Err(ValidationError::invalid_format(
                "health",
                format!("unknown project health '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_leaves_completed_or_cancelled() {
        assert!(ProjectPhase::Completed.is_terminal());
        assert!(ProjectPhase::Cancelled.is_terminal());
    }

    #[test]
    fn open_phases_reach_every_other_phase() {
        assert!(ProjectPhase::Planning.can_transition_to(&ProjectPhase::Completed));
        assert!(ProjectPhase::OnHold.can_transition_to(&ProjectPhase::Planning));
        assert!(ProjectPhase::Active.can_transition_to(&ProjectPhase::Cancelled));
        assert_eq!(ProjectPhase::Active.valid_transitions().len(), 4);
    }

    #[test]
    fn phase_parses_snake_case() {
        assert_eq!("on_hold".parse::<ProjectPhase>().unwrap(), ProjectPhase::OnHold);
        assert!("tilbud".parse::<ProjectPhase>().is_err());
    }

    #[test]
    fn health_thresholds() {
        assert_eq!(ProjectHealth::classify(50_000.0, 100_000.0), ProjectHealth::OnTrack);
        assert_eq!(ProjectHealth::classify(110_000.0, 100_000.0), ProjectHealth::OnTrack);
        assert_eq!(ProjectHealth::classify(115_000.0, 100_000.0), ProjectHealth::AtRisk);
        assert_eq!(ProjectHealth::classify(120_000.0, 100_000.0), ProjectHealth::AtRisk);
        assert_eq!(ProjectHealth::classify(125_000.0, 100_000.0), ProjectHealth::OverBudget);
    }

    #[test]
    fn exact_boundaries_stay_in_the_lower_band() {
        assert_eq!(ProjectHealth::classify(110.0, 100.0), ProjectHealth::OnTrack);
        assert_eq!(ProjectHealth::classify(120.0, 100.0), ProjectHealth::AtRisk);
        assert_eq!(ProjectHealth::classify(82_500.0, 75_000.0), ProjectHealth::OnTrack);
        assert_eq!(ProjectHealth::classify(90_000.0, 75_000.0), ProjectHealth::AtRisk);
        assert_eq!(ProjectHealth::classify(120_001.0, 100_000.0), ProjectHealth::OverBudget);
    }

    #[test]
    fn zero_budget_is_on_track() {
        assert_eq!(ProjectHealth::classify(999.0, 0.0), ProjectHealth::OnTrack);
    }
}
