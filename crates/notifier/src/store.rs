//! Notification and attendee queries.
//!
//! Every function takes a `&mut PgConnection` so the dispatch job can run them
//! inside one transaction. All values are bound parameters.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use techconf_common::types::{Attendee, Notification};

/// Data access for the `notification` and `attendee` tables.
pub struct NotificationStore;

impl NotificationStore {
    /// Fetch a notification by id.
    pub async fn fetch_notification(
        conn: &mut PgConnection,
        notification_id: i32,
    ) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, message, subject, status, submitted_date, completed_date
            FROM notification
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Fetch every attendee, in registration order.
    pub async fn fetch_attendees(conn: &mut PgConnection) -> Result<Vec<Attendee>, sqlx::Error> {
        sqlx::query_as("SELECT id, first_name, last_name, email FROM attendee ORDER BY id")
            .fetch_all(&mut *conn)
            .await
    }

    /// Record the dispatch result. Returns the number of rows updated.
    pub async fn mark_notified(
        conn: &mut PgConnection,
        notification_id: i32,
        status: &str,
        completed_date: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notification SET status = $1, completed_date = $2 WHERE id = $3",
        )
        .bind(status)
        .bind(completed_date)
        .bind(notification_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}
