//! Error types module
//!
//! All errors surfaced to HTTP clients are unified under the `AppError` enum.
//! Each variant describes its own response characteristics through the
//! `ErrorMetadata` trait; the API crate renders them as plain-text bodies.
//!
//! The `Database` variant wraps `sqlx::Error` only when the `sqlx` feature is on.

use std::io;

const MAX_CAUSE_DEPTH: usize = 5;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Level an error is logged at when it becomes a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Client mistakes: bad ids, missing form fields, oversized bodies
    Debug,
    Warn,
    /// Anything that needs an operator to look
    Error,
}

/// How an error presents itself over HTTP
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable code for log fields, e.g. `RECOVERY_FAILED`. Never sent to clients.
    fn error_code(&self) -> &'static str;

    /// Body text sent to the client. Internal failures get a generic message.
    fn client_message(&self) -> String;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to start recovery tool: {0}")]
    RecoverySpawn(String),

    #[error("Recovery tool exited with code {}", display_code(.code))]
    RecoveryFailed { code: Option<i32>, log: String },

    #[error("Recovery tool timed out after {timeout_secs}s")]
    RecoveryTimedOut { timeout_secs: u64, log: String },

    #[error("No files recovered")]
    NothingRecovered,
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "null".to_string())
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::Database(_) => (500, "DATABASE_ERROR", LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", LogLevel::Error),
        AppError::BadRequest(_) => (400, "BAD_REQUEST", LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", LogLevel::Error),
        AppError::RecoverySpawn(_) => (500, "RECOVERY_SPAWN_FAILED", LogLevel::Error),
        AppError::RecoveryFailed { .. } => (500, "RECOVERY_FAILED", LogLevel::Error),
        AppError::RecoveryTimedOut { .. } => (500, "RECOVERY_TIMED_OUT", LogLevel::Error),
        AppError::NothingRecovered => (500, "NOTHING_RECOVERED", LogLevel::Warn),
    }
}

impl AppError {
    /// Get the error type name for log fields
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
            AppError::RecoverySpawn(_) => "RecoverySpawn",
            AppError::RecoveryFailed { .. } => "RecoveryFailed",
            AppError::RecoveryTimedOut { .. } => "RecoveryTimedOut",
            AppError::NothingRecovered => "NothingRecovered",
        }
    }

    /// Display text followed by up to five `source()` causes, one per line
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let causes = std::iter::successors(self.source(), |&err| err.source());
        let mut details = self.to_string();
        for (depth, cause) in causes.enumerate() {
            if depth == MAX_CAUSE_DEPTH {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", cause));
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::RecoveryFailed { code, log } => {
                format!("PhotoRec exited with code {}\n{}", display_code(code), log)
            }
            AppError::RecoveryTimedOut { log, .. } => format!("PhotoRec timed out\n{}", log),
            AppError::NothingRecovered => "No files recovered".to_string(),
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. }
            | AppError::RecoverySpawn(_) => "Internal Server Error".to_string(),
        }
    }
}
