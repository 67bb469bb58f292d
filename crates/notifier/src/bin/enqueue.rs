//! Push notification ids onto the trigger queue.
//!
//! ## Usage
//!
//! ```bash
//! # Trigger notification 42
//! cargo run --bin enqueue -- 42
//!
//! # Several at once, against a specific Redis
//! REDIS_URL="redis://queue:6379" cargo run --bin enqueue -- 42 43
//! ```
//!
//! Reads the same `.env` and queue settings as the worker (`REDIS_URL`,
//! `NOTIFICATION_QUEUE`); no database settings are needed.

use techconf_common::config::QueueConfig;
use techconf_common::redis_pool::create_redis_connection;
use techconf_notifier::trigger::parse_notification_id;
use techconf_notifier::worker::enqueue;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techconf_notifier=info".into()),
        )
        .init();

    let ids = std::env::args()
        .skip(1)
        .map(|arg| parse_notification_id(arg.as_bytes()))
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        anyhow::bail!("usage: enqueue <notification-id>...");
    }

    let config = QueueConfig::from_env()?;

    let mut redis = create_redis_connection(&config).await?;
    enqueue(&mut redis, &config.notification_queue, &ids).await?;

    Ok(())
}
