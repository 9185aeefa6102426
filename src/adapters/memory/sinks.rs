//! In-memory activity log and notification sink.
//!
//! Both capture what they receive for assertions and can be switched into
//! a failing mode to check that side-effect errors never reach the caller.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::activity::{ActivityEntry, Notification};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ActivityRecorder, NotificationSink};

#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    entries: Mutex<Vec<ActivityEntry>>,
    failing: AtomicBool,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that rejects every entry.
    pub fn failing() -> Self {
        let log = Self::default();
        log.failing.store(true, Ordering::SeqCst);
        log
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.title).collect()
    }
}

#[async_trait]
impl ActivityRecorder for InMemoryActivityLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::DatabaseError, "activity log unavailable"));
        }
        self.entries
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "activity log lock poisoned"))?
            .push(entry);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    sent: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        sink.failing.store(true, Ordering::SeqCst);
        sink
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "notification store unavailable",
            ));
        }
        self.sent
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "notification lock poisoned"))?
            .push(notification);
        Ok(())
    }
}
