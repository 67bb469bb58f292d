use async_trait::async_trait;

use super::{EmailError, EmailMessage, EmailSender};

/// Logs each message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "No email provider configured, skipping delivery"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_always_succeeds() {
        let message = EmailMessage {
            from: "admin@techconf.com".to_string(),
            to: "alan@x.com".to_string(),
            subject: "Alan: Don't forget!".to_string(),
            body: "Reminder".to_string(),
        };
        assert!(LogEmailSender.send(&message).await.is_ok());
    }
}
