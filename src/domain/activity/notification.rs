//! Notifications fanned out to users.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{Timestamp, UserId};

use super::ActivityTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DealStageChanged,
    DealWon,
    DealWonConfirmation,
    DealLost,
    OfferSent,
    OfferAccepted,
    OfferRejected,
    ProjectCreated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::DealStageChanged => "deal_stage_changed",
            NotificationKind::DealWon => "deal_won",
            NotificationKind::DealWonConfirmation => "deal_won_confirmation",
            NotificationKind::DealLost => "deal_lost",
            NotificationKind::OfferSent => "offer_sent",
            NotificationKind::OfferAccepted => "offer_accepted",
            NotificationKind::OfferRejected => "offer_rejected",
            NotificationKind::ProjectCreated => "project_created",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message for one recipient about one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub target: ActivityTarget,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        target: impl Into<ActivityTarget>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            target: target.into(),
            created_at: Timestamp::now(),
        }
    }
}
