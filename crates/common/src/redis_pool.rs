use redis::Client;
use redis::aio::ConnectionManager;

use crate::config::QueueConfig;

/// Open a reconnecting Redis connection for the trigger queue in `queue`.
pub async fn create_redis_connection(queue: &QueueConfig) -> anyhow::Result<ConnectionManager> {
    let client = Client::open(queue.redis_url.as_str())
        .map_err(|e| anyhow::anyhow!("REDIS_URL is not a valid Redis URL: {}", e))?;
    let manager = ConnectionManager::new(client).await?;

    tracing::info!(
        queue = %queue.notification_queue,
        dead_letter_queue = queue.dead_letter_queue.as_deref().unwrap_or("<disabled>"),
        "Connected to Redis trigger queue"
    );
    Ok(manager)
}
