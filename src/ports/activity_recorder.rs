//! Activity and notification sink ports.
//!
//! Both are invoked after the primary change has committed. A failing sink
//! never undoes the change it describes.

use crate::domain::activity::{ActivityEntry, Notification};
use crate::domain::foundation::DomainError;
use async_trait::async_trait;

/// Appends entries to the activity log shown on deals, offers and projects.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    async fn record(&self, entry: ActivityEntry) -> Result<(), DomainError>;
}

/// Fire-and-forget fan-out of user notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError>;
}
