//! Configuration module
//!
//! Configuration is read from the environment (optionally seeded from a
//! `.env` file) once at startup and passed explicitly to every component.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const HARVEST_DELAY_SECS: u64 = 5;
const MAX_UPLOAD_SIZE_MB: usize = 4096;

/// Server and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Recovery job settings: filesystem layout, external tool invocation and limits
#[derive(Clone, Debug)]
pub struct RecoveryConfig {
    pub base: BaseConfig,
    /// Root for `uploads/`, `temp/`, `recovered_files/` and the per-job log files
    pub data_dir: PathBuf,
    pub photorec_path: String,
    pub photorec_log_flag: String,
    pub photorec_dest_flag: String,
    /// Wait between the tool exiting and its output directory being scanned
    pub harvest_delay_secs: u64,
    /// Kill deadline for the tool. `None` waits forever.
    pub recovery_timeout_secs: Option<u64>,
    pub max_upload_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<RecoveryConfig>);

impl Config {
    fn as_recovery(&self) -> &RecoveryConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_recovery().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = RecoveryConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_recovery().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_recovery().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_recovery().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_recovery().base.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_recovery().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_recovery().base.db_timeout_seconds
    }

    pub fn data_dir(&self) -> &Path {
        &self.as_recovery().data_dir
    }

    pub fn photorec_path(&self) -> &str {
        &self.as_recovery().photorec_path
    }

    pub fn photorec_log_flag(&self) -> &str {
        &self.as_recovery().photorec_log_flag
    }

    pub fn photorec_dest_flag(&self) -> &str {
        &self.as_recovery().photorec_dest_flag
    }

    pub fn harvest_delay(&self) -> Duration {
        Duration::from_secs(self.as_recovery().harvest_delay_secs)
    }

    pub fn recovery_timeout(&self) -> Option<Duration> {
        self.as_recovery()
            .recovery_timeout_secs
            .map(Duration::from_secs)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_recovery().max_upload_size_bytes
    }
}

impl RecoveryConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| ".".to_string()));

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite://{}?mode=rwc", data_dir.join("salvor.db").display())
        });

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let config = RecoveryConfig {
            base,
            data_dir,
            photorec_path: env::var("PHOTOREC_PATH").unwrap_or_else(|_| "photorec".to_string()),
            photorec_log_flag: env::var("PHOTOREC_LOG_FLAG")
                .unwrap_or_else(|_| "/log".to_string()),
            photorec_dest_flag: env::var("PHOTOREC_DEST_FLAG")
                .unwrap_or_else(|_| "/d".to_string()),
            harvest_delay_secs: env::var("HARVEST_DELAY_SECS")
                .unwrap_or_else(|_| HARVEST_DELAY_SECS.to_string())
                .parse()
                .unwrap_or(HARVEST_DELAY_SECS),
            recovery_timeout_secs: env::var("RECOVERY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&secs: &u64| secs > 0),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_MB")
                .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base.database_url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid SQLite connection string"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS cannot be 0"));
        }

        if self.base.db_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("DB_TIMEOUT_SECONDS cannot be 0"));
        }

        if self.photorec_path.trim().is_empty() {
            return Err(anyhow::anyhow!("PHOTOREC_PATH cannot be empty"));
        }

        // The tool is spawned without a shell, but a path carrying shell syntax is a misconfiguration.
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if self.photorec_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(anyhow::anyhow!(
                "PHOTOREC_PATH contains dangerous characters"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecoveryConfig {
        RecoveryConfig {
            base: BaseConfig {
                server_port: 3000,
                environment: "development".to_string(),
                database_url: "sqlite::memory:".to_string(),
                db_max_connections: 1,
                db_timeout_seconds: 30,
            },
            data_dir: PathBuf::from("/tmp/salvor"),
            photorec_path: "/usr/bin/photorec".to_string(),
            photorec_log_flag: "/log".to_string(),
            photorec_dest_flag: "/d".to_string(),
            harvest_delay_secs: 5,
            recovery_timeout_secs: None,
            max_upload_size_bytes: 1024,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_sqlite_url() {
        let mut config = sample();
        config.base.database_url = "postgresql://localhost/salvor".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_shell_syntax_in_tool_path() {
        let mut config = sample();
        config.photorec_path = "photorec; rm -rf /".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dangerous"));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = sample();
        config.base.db_max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.max_upload_size_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_getters() {
        let mut inner = sample();
        inner.recovery_timeout_secs = Some(90);
        inner.base.environment = "Prod".to_string();
        let config = Config(Box::new(inner));

        assert!(config.is_production());
        assert_eq!(config.harvest_delay(), Duration::from_secs(5));
        assert_eq!(config.recovery_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.data_dir(), Path::new("/tmp/salvor"));
        assert_eq!(config.photorec_dest_flag(), "/d");
    }
}
