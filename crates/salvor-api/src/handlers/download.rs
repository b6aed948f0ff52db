use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use salvor_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Stream a file from an upload's recovered directory.
///
/// The name is resolved on disk directly and is not checked against the
/// upload's recorded files. Names that could escape the directory get 400.
#[tracing::instrument(
    skip(state),
    fields(upload_id = %upload_id, filename = %filename, operation = "download_recovered_file")
)]
pub async fn download_recovered_file(
    State(state): State<Arc<AppState>>,
    Path((upload_id, filename)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (stream, size) = state.storage.download_stream(upload_id, &filename).await?;

    tracing::debug!(size_bytes = size, "Streaming recovered file");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

fn content_disposition(filename: &str) -> String {
    let quoted: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("attachment; filename=\"{}\"", quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_quotes_plain_names() {
        assert_eq!(
            content_disposition("f0001.jpg"),
            "attachment; filename=\"f0001.jpg\""
        );
    }

    #[test]
    fn disposition_neutralizes_quotes_and_controls() {
        assert_eq!(
            content_disposition("a\"b\r\n.jpg"),
            "attachment; filename=\"a_b__.jpg\""
        );
    }
}
