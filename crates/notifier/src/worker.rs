//! Redis queue consumer.
//!
//! Pops trigger messages off the notification queue one at a time and hands the
//! parsed id to the `DispatchJob`. Each message is consumed exactly once: a
//! failed trigger is not retried but its raw body is pushed onto the
//! dead-letter list (when configured) for manual replay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use techconf_common::config::QueueConfig;
use techconf_common::error::AppError;

use crate::dispatch::{DispatchJob, DispatchOutcome};
use crate::trigger::parse_notification_id;

/// What happened to a consumed trigger message.
#[derive(Debug)]
pub enum MessageDisposition {
    Dispatched(DispatchOutcome),
    DeadLettered { reason: String },
    Dropped { reason: String },
}

/// Consumes notification triggers from a Redis list.
pub struct NotificationWorker {
    redis: ConnectionManager,
    job: DispatchJob,
    queue: String,
    dead_letter_queue: Option<String>,
    poll_timeout_secs: u64,
}

impl NotificationWorker {
    pub fn new(redis: ConnectionManager, job: DispatchJob, config: &QueueConfig) -> Self {
        Self {
            redis,
            job,
            queue: config.notification_queue.clone(),
            dead_letter_queue: config.dead_letter_queue.clone(),
            poll_timeout_secs: config.poll_timeout_secs.max(1),
        }
    }

    /// Consume messages until `shutdown` is set.
    ///
    /// The flag is checked between messages, so an in-flight dispatch always
    /// runs to completion. Only Redis errors end the loop early.
    pub async fn run(&mut self, shutdown: Arc<AtomicBool>) -> Result<(), AppError> {
        tracing::info!(
            queue = %self.queue,
            dead_letter_queue = ?self.dead_letter_queue,
            "Notification worker started"
        );

        while !shutdown.load(Ordering::SeqCst) {
            let popped: Option<(String, Vec<u8>)> = self
                .redis
                .brpop(&self.queue, self.poll_timeout_secs as f64)
                .await?;

            let Some((_, body)) = popped else {
                continue;
            };

            match self.handle_message(&body).await? {
                MessageDisposition::Dispatched(outcome) => tracing::debug!(
                    notification_id = outcome.notification_id,
                    status = %outcome.status,
                    "Trigger acknowledged"
                ),
                MessageDisposition::DeadLettered { reason } => {
                    tracing::debug!(reason = %reason, "Trigger parked for replay")
                }
                MessageDisposition::Dropped { reason } => {
                    tracing::debug!(reason = %reason, "Trigger discarded")
                }
            }
        }

        tracing::info!("Notification worker stopped");
        Ok(())
    }

    /// Process one trigger body.
    pub async fn handle_message(&mut self, body: &[u8]) -> Result<MessageDisposition, AppError> {
        let reason = match parse_notification_id(body) {
            Ok(notification_id) => {
                tracing::info!(notification_id, "Queue trigger received");
                match self.job.run(notification_id).await {
                    Ok(outcome) => return Ok(MessageDisposition::Dispatched(outcome)),
                    Err(e) => e.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(
                    body = %String::from_utf8_lossy(body),
                    error = %e,
                    "Rejected malformed trigger"
                );
                e.to_string()
            }
        };

        self.dead_letter(body, reason).await
    }

    async fn dead_letter(
        &mut self,
        body: &[u8],
        reason: String,
    ) -> Result<MessageDisposition, AppError> {
        let Some(dead_letter_queue) = &self.dead_letter_queue else {
            tracing::warn!(reason = %reason, "Trigger dropped, no dead-letter queue configured");
            return Ok(MessageDisposition::Dropped { reason });
        };

        self.redis
            .lpush::<_, _, ()>(dead_letter_queue, body)
            .await?;

        tracing::warn!(
            dead_letter_queue = %dead_letter_queue,
            reason = %reason,
            "Trigger moved to dead-letter queue"
        );
        Ok(MessageDisposition::DeadLettered { reason })
    }
}

/// Push notification ids onto the trigger queue.
pub async fn enqueue(
    redis: &mut ConnectionManager,
    queue: &str,
    notification_ids: &[i32],
) -> Result<(), AppError> {
    for id in notification_ids {
        redis.lpush::<_, _, ()>(queue, id.to_string()).await?;
        tracing::info!(notification_id = *id, queue, "Notification enqueued");
    }
    Ok(())
}
