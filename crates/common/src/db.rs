use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::error::AppError;

/// Longest a dispatch run waits for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Connect the notifier's pool, failing at startup if PostgreSQL is unreachable.
///
/// Takes parsed options rather than a URL so credentials never need escaping;
/// see `DatabaseConfig::connect_options`.
pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
) -> anyhow::Result<PgPool> {
    let host = options.get_host().to_string();
    let database = options.get_database().unwrap_or_default().to_string();

    let pool = pool_options(max_connections).connect_with(options).await?;

    tracing::info!(%host, %database, max_connections, "Connected to notification database");
    Ok(pool)
}

/// Pool that connects on first acquire, so connection errors reach the
/// dispatch job instead of startup.
pub fn create_lazy_pool(options: PgConnectOptions, max_connections: u32) -> PgPool {
    pool_options(max_connections).connect_lazy_with(options)
}

/// Apply the workspace migrations (`notification` and `attendee` tables).
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
