//! Outbound email delivery.
//!
//! The dispatch job only sees the `EmailSender` trait. Two implementations:
//! - `SendGridEmailSender` posts to the SendGrid v3 HTTP API
//! - `LogEmailSender` logs the message and reports success (no API key configured)

mod log_only;
mod sendgrid;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use log_only::LogEmailSender;
pub use sendgrid::SendGridEmailSender;

/// A single plain-text email addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Errors from a single send attempt.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Submits one message per call to an email provider.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;

    /// Short provider name for logs (e.g., "sendgrid").
    fn name(&self) -> &'static str;
}
