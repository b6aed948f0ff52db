//! Database setup and initialization

use anyhow::{Context, Result};
use salvor_core::Config;
use sqlx::SqlitePool;
use std::time::Duration;

/// Open the connection pool and apply pending migrations
pub async fn setup_database(config: &Config) -> Result<SqlitePool> {
    tracing::info!("Connecting to database...");

    let pool = salvor_db::connect(
        config.database_url(),
        config.db_max_connections(),
        Duration::from_secs(config.db_timeout_seconds()),
    )
    .await
    .context("Failed to open database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected and migrations applied"
    );

    Ok(pool)
}
