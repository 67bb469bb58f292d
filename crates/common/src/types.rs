use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An announcement queued by an administrator for broadcast to all attendees.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i32,
    pub message: String,
    pub subject: String,
    /// Free-text summary, e.g. "Notified 2 attendees" once dispatched
    pub status: String,
    pub submitted_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
}

impl Notification {
    /// Whether a dispatch job has committed a result for this notification.
    pub fn is_completed(&self) -> bool {
        self.completed_date.is_some()
    }
}

/// A registered conference participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Attendee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
