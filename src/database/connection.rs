use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Build the sales pool without touching the network.
///
/// Connections are established on first acquire, so an unreachable database
/// degrades the tiles instead of preventing startup.
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let url = config.database_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .test_before_acquire(true)
        .connect_lazy(url)?;

    debug!(
        max_connections = config.max_connections,
        acquire_timeout_seconds = config.acquire_timeout_seconds,
        "Created lazy sales database pool"
    );
    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> Result<bool> {
    let row = sqlx::query("SELECT 1 AS health").fetch_one(pool).await?;
    let health: i32 = row.try_get("health")?;
    Ok(health == 1)
}
