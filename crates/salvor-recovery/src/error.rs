use salvor_core::AppError;
use salvor_storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("Upload not found: {0}")]
    UploadNotFound(Uuid),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Recovery tool exited with code {code:?}")]
    Failed { code: Option<i32>, log: String },

    #[error("Recovery tool timed out after {timeout_secs}s")]
    TimedOut { timeout_secs: u64, log: String },

    #[error("No files recovered")]
    NothingRecovered,

    #[error("Failed to scan output directory: {0}")]
    Scan(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<RecoveryError> for AppError {
    fn from(err: RecoveryError) -> Self {
        match err {
            RecoveryError::UploadNotFound(_) => AppError::NotFound("File not found".to_string()),
            RecoveryError::Spawn { program, source } => {
                AppError::RecoverySpawn(format!("{}: {}", program, source))
            }
            RecoveryError::Failed { code, log } => AppError::RecoveryFailed { code, log },
            RecoveryError::TimedOut { timeout_secs, log } => {
                AppError::RecoveryTimedOut { timeout_secs, log }
            }
            RecoveryError::NothingRecovered => AppError::NothingRecovered,
            RecoveryError::Scan(msg) => AppError::Storage(msg),
            RecoveryError::Storage(e) => e.into(),
            RecoveryError::App(e) => e,
        }
    }
}
