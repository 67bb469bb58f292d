use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{EmailError, EmailMessage, EmailSender};

const DEFAULT_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Sends email through the SendGrid v3 `mail/send` endpoint.
pub struct SendGridEmailSender {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl SendGridEmailSender {
    /// `timeout` bounds each request end to end. Sends run while the dispatch
    /// transaction is open, so a stalled provider must not hold it forever.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Point the sender at a different endpoint (sandbox or local mock).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn payload(message: &EmailMessage) -> serde_json::Value {
        json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": message.from },
            "subject": message.subject,
            "content": [{ "type": "text/plain", "value": message.body }],
        })
    }
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&Self::payload(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %message.to, status = status.as_u16(), "Email accepted by SendGrid");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tokio::net::TcpListener;

    use super::*;

    fn make_message() -> EmailMessage {
        EmailMessage {
            from: "admin@techconf.com".to_string(),
            to: "ada@x.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        }
    }

    #[test]
    fn test_payload_has_distinct_fields() {
        let message = EmailMessage {
            from: "admin@techconf.com".to_string(),
            to: "ada@x.com".to_string(),
            subject: "Ada: Don't forget!".to_string(),
            body: "Reminder".to_string(),
        };

        let payload = SendGridEmailSender::payload(&message);

        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "ada@x.com");
        assert_eq!(payload["from"]["email"], "admin@techconf.com");
        assert_eq!(payload["subject"], "Ada: Don't forget!");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][0]["value"], "Reminder");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let sender = SendGridEmailSender::new("test-key".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_api_url("http://127.0.0.1:9/v3");

        let result = sender.send(&make_message()).await;
        assert!(matches!(result, Err(EmailError::Http(_))));
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out() {
        // Accepts the connection, then never writes a response
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(socket);
        });

        let sender = SendGridEmailSender::new("test-key".to_string(), Duration::from_millis(500))
            .unwrap()
            .with_api_url(format!("http://{}/v3/mail/send", addr));

        let started = Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(10), sender.send(&make_message()))
            .await
            .expect("send should give up on its own before the outer deadline");

        match result {
            Err(EmailError::Http(e)) => assert!(e.is_timeout(), "expected timeout, got {}", e),
            other => panic!("expected timeout error, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(5));

        server.abort();
    }

    #[test]
    fn test_sender_name() {
        let sender = SendGridEmailSender::new("k".to_string(), Duration::from_secs(1)).unwrap();
        assert_eq!(sender.name(), "sendgrid");
    }
}
