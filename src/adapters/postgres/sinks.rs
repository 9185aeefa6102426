//! PostgreSQL-backed activity log and notification inbox.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::activity::{ActivityEntry, Notification};
use crate::domain::foundation::DomainError;
use crate::ports::{ActivityRecorder, NotificationSink};

use super::rows::db_error;

/// Appends activity entries to the `activities` table.
#[derive(Clone)]
pub struct PostgresActivityLog {
    pool: PgPool,
}

impl PostgresActivityLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRecorder for PostgresActivityLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO activities (
                id, target_type, target_id, title, body, actor_id, actor_name, occurred_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.target.kind.as_str())
        .bind(entry.target.id)
        .bind(&entry.title)
        .bind(&entry.body)
        .bind(entry.actor_id.as_str())
        .bind(&entry.actor_name)
        .bind(entry.occurred_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record activity", e))?;
        Ok(())
    }
}

/// Stores notifications for their recipients in the `notifications` table.
#[derive(Clone)]
pub struct PostgresNotificationSink {
    pool: PgPool,
}

impl PostgresNotificationSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PostgresNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_id, kind, title, message, target_type, target_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id)
        .bind(notification.recipient.as_str())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.target.kind.as_str())
        .bind(notification.target.id)
        .bind(notification.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store notification", e))?;
        Ok(())
    }
}
