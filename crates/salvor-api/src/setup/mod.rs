//! Application setup and initialization
//!
//! Startup runs in a fixed order: validate configuration, install tracing,
//! lay out storage, open the database, then build state and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use salvor_core::Config;
use salvor_infra::{init_telemetry, LogFormat};
use salvor_recovery::TokioSleeper;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;

    let pool = database::setup_database(&config).await?;

    let state = Arc::new(AppState::new(
        config.clone(),
        pool,
        storage,
        Arc::new(TokioSleeper),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
