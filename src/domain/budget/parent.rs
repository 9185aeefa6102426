//! Parent reference for budget lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::{OfferId, ProjectId, ValidationError};

/// Kind tag stored next to the parent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetParentKind {
    Offer,
    Project,
}

impl BudgetParentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetParentKind::Offer => "offer",
            BudgetParentKind::Project => "project",
        }
    }
}

impl FromStr for BudgetParentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offer" => Ok(BudgetParentKind::Offer),
            "project" => Ok(BudgetParentKind::Project),
            other => Err(ValidationError::invalid_format(
                "parent_type",
                format!("unknown budget parent '{}'", other),
            )),
        }
    }
}

/// The single Offer or Project a budget line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "parent_type", content = "parent_id", rename_all = "snake_case")]
pub enum BudgetParent {
    Offer(OfferId),
    Project(ProjectId),
}

impl BudgetParent {
    pub fn from_parts(kind: BudgetParentKind, id: Uuid) -> Self {
        match kind {
            BudgetParentKind::Offer => BudgetParent::Offer(OfferId::from_uuid(id)),
            BudgetParentKind::Project => BudgetParent::Project(ProjectId::from_uuid(id)),
        }
    }

    pub fn kind(&self) -> BudgetParentKind {
        match self {
            BudgetParent::Offer(_) => BudgetParentKind::Offer,
            BudgetParent::Project(_) => BudgetParentKind::Project,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            BudgetParent::Offer(id) => *id.as_uuid(),
            BudgetParent::Project(id) => *id.as_uuid(),
        }
    }
}

impl From<OfferId> for BudgetParent {
    fn from(id: OfferId) -> Self {
        BudgetParent::Offer(id)
    }
}

impl From<ProjectId> for BudgetParent {
    fn from(id: ProjectId) -> Self {
        BudgetParent::Project(id)
    }
}

impl fmt::Display for BudgetParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind().as_str(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_round_trip_through_kind_and_id() {
        let offer = OfferId::new();
        let parent = BudgetParent::from(offer);
        assert_eq!(BudgetParent::from_parts(parent.kind(), parent.id()), parent);
    }

    #[test]
    fn display_includes_kind() {
        let project = ProjectId::new();
        let parent = BudgetParent::from(project);
        assert_eq!(parent.to_string(), format!("project/{}", project));
    }

    #[test]
    fn kind_parses_known_tags_only() {
        assert_eq!("offer".parse::<BudgetParentKind>().unwrap(), BudgetParentKind::Offer);
        assert!("deal".parse::<BudgetParentKind>().is_err());
    }
}
