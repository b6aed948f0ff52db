use salvor_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Reading the incoming body failed; the inner error comes from the body source
    #[error("Upload stream failed: {0}")]
    StreamFailed(#[source] std::io::Error),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Move failed: {0}")]
    MoveFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound("File not found".to_string()),
            StorageError::InvalidFilename(msg) => AppError::BadRequest(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salvor_core::ErrorMetadata;

    #[test]
    fn test_conversion_to_app_error() {
        let err: AppError = StorageError::NotFound("/data/x".to_string()).into();
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.client_message(), "File not found");

        let err: AppError = StorageError::InvalidFilename("bad".to_string()).into();
        assert_eq!(err.http_status_code(), 400);

        let err: AppError = StorageError::MoveFailed("cross device".to_string()).into();
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Internal Server Error");
    }
}
