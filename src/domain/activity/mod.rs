//! Side-effect records handed to the activity log and notification sinks.

mod entry;
mod notification;

pub use entry::{ActivityEntry, ActivityTarget, ActivityTargetKind};
pub use notification::{Notification, NotificationKind};
