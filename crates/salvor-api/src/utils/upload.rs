//! Streaming multipart intake

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use futures::TryStreamExt;
use salvor_core::AppError;
use salvor_storage::{LocalStorage, StorageError};
use std::io;
use std::path::PathBuf;
use tokio_util::io::StreamReader;

const FILE_FIELD: &str = "file";

/// An upload body written to disk, not yet recorded
#[derive(Debug)]
pub struct StoredFile {
    pub original_filename: String,
    pub path: PathBuf,
}

/// Stream the single `file` field of a multipart form to storage.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn store_multipart_file(
    storage: &LocalStorage,
    mut multipart: Multipart,
) -> Result<StoredFile, AppError> {
    let mut stored: Option<StoredFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                discard(storage, stored.take()).await;
                return Err(multipart_error(&e));
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(original_filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        if stored.is_some() {
            discard(storage, stored.take()).await;
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let reader = StreamReader::new(Box::pin(field.map_err(io::Error::other)));
        let path = storage
            .store_upload_stream(&original_filename, reader)
            .await
            .map_err(stream_error)?;

        stored = Some(StoredFile {
            original_filename,
            path,
        });
    }

    stored.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))
}

async fn discard(storage: &LocalStorage, stored: Option<StoredFile>) {
    if let Some(file) = stored {
        if let Err(e) = storage.remove_upload(&file.path).await {
            tracing::warn!(path = %file.path.display(), error = %e, "Failed to discard upload");
        }
    }
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File exceeds the maximum upload size".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

/// Body errors surface from storage wrapped in `StreamFailed`
fn stream_error(err: StorageError) -> AppError {
    match err {
        StorageError::StreamFailed(io_err) => {
            match io_err
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>())
            {
                Some(multipart_err) => multipart_error(multipart_err),
                None => AppError::BadRequest(format!("Failed to read upload: {}", io_err)),
            }
        }
        other => other.into(),
    }
}
