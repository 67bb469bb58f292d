//! TechConf notification worker binary entrypoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use techconf_common::config::AppConfig;
use techconf_common::db;
use techconf_common::redis_pool::create_redis_connection;
use techconf_notifier::dispatch::DispatchJob;
use techconf_notifier::email::{EmailSender, LogEmailSender, SendGridEmailSender};
use techconf_notifier::worker::NotificationWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techconf_notifier=info,techconf_common=info".into()),
        )
        .json()
        .init();

    tracing::info!("TechConf notifier starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Connect to database
    let pool =
        db::create_pool(config.database.connect_options()?, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    // Connect to the trigger queue
    let redis = create_redis_connection(&config.queue).await?;

    let sender: Arc<dyn EmailSender> = match &config.sendgrid_api_key {
        Some(key) => Arc::new(SendGridEmailSender::new(
            key.clone(),
            Duration::from_secs(config.email_timeout_secs),
        )?),
        None => {
            tracing::warn!("SENDGRID_API_KEY not set, emails will only be logged");
            Arc::new(LogEmailSender)
        }
    };
    tracing::info!(provider = sender.name(), "Email sender configured");

    let job = DispatchJob::from_config(pool, sender, &config);
    let mut worker = NotificationWorker::new(redis, job, &config.queue);

    // Stop between messages on Ctrl+C
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal, finishing current message...");
            flag.store(true, Ordering::SeqCst);
        }
    });

    if let Err(e) = worker.run(shutdown).await {
        tracing::error!(error = %e, "Notification worker exited with error");
        return Err(e.into());
    }

    tracing::info!("TechConf notifier stopped.");
    Ok(())
}
