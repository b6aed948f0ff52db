//! Configuration validation
//!
//! Runs the config's own checks, then looks at the environment for problems
//! that are only worth a warning.

use anyhow::Result;
use salvor_core::Config;
use std::path::Path;

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!("Production mode detected but ENVIRONMENT/APP_ENV not set");
    }

    // Bare names are resolved through PATH at spawn time.
    let photorec = Path::new(config.photorec_path());
    if photorec.is_absolute() && !photorec.exists() {
        tracing::warn!(
            photorec_path = %config.photorec_path(),
            "Recovery binary not found; recovery requests will fail"
        );
    }

    if config.recovery_timeout().is_none() {
        tracing::debug!("No recovery timeout configured; the tool may run indefinitely");
    }

    Ok(())
}
