//! Activity log records.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::budget::{BudgetParent, BudgetParentKind};
use crate::domain::foundation::{Caller, DealId, OfferId, ProjectId, Timestamp, UserId};

/// Kind of record an activity is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTargetKind {
    Deal,
    Offer,
    Project,
}

impl ActivityTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityTargetKind::Deal => "deal",
            ActivityTargetKind::Offer => "offer",
            ActivityTargetKind::Project => "project",
        }
    }
}

impl fmt::Display for ActivityTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The record an activity describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityTarget {
    pub kind: ActivityTargetKind,
    pub id: Uuid,
}

impl From<DealId> for ActivityTarget {
    fn from(id: DealId) -> Self {
        Self {
            kind: ActivityTargetKind::Deal,
            id: *id.as_uuid(),
        }
    }
}

impl From<OfferId> for ActivityTarget {
    fn from(id: OfferId) -> Self {
        Self {
            kind: ActivityTargetKind::Offer,
            id: *id.as_uuid(),
        }
    }
}

impl From<ProjectId> for ActivityTarget {
    fn from(id: ProjectId) -> Self {
        Self {
            kind: ActivityTargetKind::Project,
            id: *id.as_uuid(),
        }
    }
}

impl From<BudgetParent> for ActivityTarget {
    fn from(parent: BudgetParent) -> Self {
        let kind = match parent.kind() {
            BudgetParentKind::Offer => ActivityTargetKind::Offer,
            BudgetParentKind::Project => ActivityTargetKind::Project,
        };
        Self {
            kind,
            id: parent.id(),
        }
    }
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub target: ActivityTarget,
    pub title: String,
    pub body: String,
    pub actor_id: UserId,
    pub actor_name: String,
    pub occurred_at: Timestamp,
}

impl ActivityEntry {
    pub fn new(
        target: impl Into<ActivityTarget>,
        title: impl Into<String>,
        body: impl Into<String>,
        actor: &Caller,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target: target.into(),
            title: title.into(),
            body: body.into(),
            actor_id: actor.user_id.clone(),
            actor_name: actor.name().to_string(),
            occurred_at: Timestamp::now(),
        }
    }
}
