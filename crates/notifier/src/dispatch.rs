//! Notification dispatch job.
//!
//! One run per triggered notification id:
//! 1. Read the notification (subject + message) and all attendees
//! 2. Send one email per attendee, collecting per-attendee failures
//! 3. Write the status summary and `completed_date`
//!
//! All database work happens in a single transaction. Any database error or a
//! missing notification rolls it back, leaving the row untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use techconf_common::config::AppConfig;
use techconf_common::types::{Attendee, Notification};

use crate::email::{EmailMessage, EmailSender};
use crate::store::NotificationStore;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification {0} not found")]
    NotificationNotFound(i32),
}

/// An attendee whose email could not be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub attendee_id: i32,
    pub email: String,
    pub error: String,
}

/// Result of the email fan-out for one notification.
#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    pub attempted: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl FanOutReport {
    pub fn sent(&self) -> usize {
        self.attempted - self.failures.len()
    }

    /// Human-readable summary stored in `notification.status`.
    pub fn status_text(&self) -> String {
        if self.failures.is_empty() {
            format!("Notified {} attendees", self.attempted)
        } else {
            format!(
                "Notified {} of {} attendees ({} failed)",
                self.sent(),
                self.attempted,
                self.failures.len()
            )
        }
    }
}

/// Committed result of a dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub notification_id: i32,
    pub status: String,
    pub completed_date: DateTime<Utc>,
    pub report: FanOutReport,
}

/// Build the email for one attendee.
///
/// The subject is prefixed with the attendee's first name. The body greets the
/// attendee by full name and then carries the notification message verbatim.
pub fn build_email(from: &str, notification: &Notification, attendee: &Attendee) -> EmailMessage {
    let first_name = attendee.first_name.trim();
    let subject = if first_name.is_empty() {
        notification.subject.clone()
    } else {
        format!("{}: {}", first_name, notification.subject)
    };

    let full_name = attendee.full_name();
    let body = if full_name.is_empty() {
        notification.message.clone()
    } else {
        format!("Dear {},\n\n{}", full_name, notification.message)
    };

    EmailMessage {
        from: from.to_string(),
        to: attendee.email.clone(),
        subject,
        body,
    }
}

/// Send one email per attendee. A failed send is recorded and the loop continues.
pub async fn fan_out(
    sender: &dyn EmailSender,
    from: &str,
    notification: &Notification,
    attendees: &[Attendee],
) -> FanOutReport {
    let mut report = FanOutReport {
        attempted: attendees.len(),
        failures: Vec::new(),
    };

    for attendee in attendees {
        let email = build_email(from, notification, attendee);

        if let Err(e) = sender.send(&email).await {
            tracing::warn!(
                attendee_id = attendee.id,
                to = %attendee.email,
                provider = sender.name(),
                error = %e,
                "Email submission failed"
            );
            report.failures.push(DeliveryFailure {
                attendee_id: attendee.id,
                email: attendee.email.clone(),
                error: e.to_string(),
            });
        }
    }

    report
}

/// Runs the read → fan-out → update workflow for a notification id.
#[derive(Clone)]
pub struct DispatchJob {
    pool: PgPool,
    sender: Arc<dyn EmailSender>,
    from_address: String,
    conference_id: i32,
}

impl DispatchJob {
    pub fn new(
        pool: PgPool,
        sender: Arc<dyn EmailSender>,
        from_address: String,
        conference_id: i32,
    ) -> Self {
        Self {
            pool,
            sender,
            from_address,
            conference_id,
        }
    }

    pub fn from_config(pool: PgPool, sender: Arc<dyn EmailSender>, config: &AppConfig) -> Self {
        Self::new(
            pool,
            sender,
            config.admin_email_address.clone(),
            config.conference_id,
        )
    }

    /// Dispatch a notification. Errors are logged before being returned.
    pub async fn run(&self, notification_id: i32) -> Result<DispatchOutcome, DispatchError> {
        let span = tracing::info_span!(
            "dispatch",
            notification_id,
            run_id = %Uuid::new_v4(),
            conference_id = self.conference_id
        );

        async {
            match self.execute(notification_id).await {
                Ok(outcome) => {
                    tracing::info!(
                        status = %outcome.status,
                        attendees = outcome.report.attempted,
                        failed = outcome.report.failures.len(),
                        "Notification dispatched"
                    );
                    Ok(outcome)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Notification dispatch failed, rolled back");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, notification_id: i32) -> Result<DispatchOutcome, DispatchError> {
        let mut tx = self.pool.begin().await?;

        match self.process(&mut *tx, notification_id).await {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn process(
        &self,
        conn: &mut PgConnection,
        notification_id: i32,
    ) -> Result<DispatchOutcome, DispatchError> {
        tracing::info!("Fetching notification message and subject");
        let notification = NotificationStore::fetch_notification(conn, notification_id)
            .await?
            .ok_or(DispatchError::NotificationNotFound(notification_id))?;

        tracing::info!("Fetching attendees");
        let attendees = NotificationStore::fetch_attendees(conn).await?;

        tracing::info!(attendees = attendees.len(), "Sending emails");
        let report = fan_out(
            self.sender.as_ref(),
            &self.from_address,
            &notification,
            &attendees,
        )
        .await;

        let status = report.status_text();
        let completed_date = Utc::now();

        tracing::info!(status = %status, "Updating notification");
        let updated =
            NotificationStore::mark_notified(conn, notification_id, &status, completed_date)
                .await?;
        if updated == 0 {
            return Err(DispatchError::NotificationNotFound(notification_id));
        }

        Ok(DispatchOutcome {
            notification_id,
            status,
            completed_date,
            report,
        })
    }
}
