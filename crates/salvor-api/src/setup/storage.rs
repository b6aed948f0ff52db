//! Storage setup

use anyhow::{Context, Result};
use salvor_core::Config;
use salvor_storage::LocalStorage;

/// Create the data directory layout (uploads, scratch, recovered files)
pub async fn setup_storage(config: &Config) -> Result<LocalStorage> {
    let storage = LocalStorage::new(config.data_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to prepare data directory {}",
                config.data_dir().display()
            )
        })?;

    tracing::info!(
        data_dir = %storage.base_path().display(),
        "Local storage initialized"
    );

    Ok(storage)
}
