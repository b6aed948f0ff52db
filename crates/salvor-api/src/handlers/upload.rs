use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::store_multipart_file;
use axum::{
    extract::{Multipart, State},
    response::Redirect,
};
use std::sync::Arc;

/// Store the submitted image, then record it.
///
/// A failed insert leaves the stored file on disk with no record pointing at it.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Redirect, HttpAppError> {
    let stored = store_multipart_file(&state.storage, multipart).await?;

    let upload = match state
        .db
        .uploads
        .create_upload(&stored.original_filename, &stored.path.to_string_lossy())
        .await
    {
        Ok(upload) => upload,
        Err(e) => {
            tracing::warn!(
                path = %stored.path.display(),
                original_filename = %stored.original_filename,
                "Upload stored on disk but not recorded"
            );
            return Err(e.into());
        }
    };

    tracing::info!(
        upload_id = %upload.id,
        original_filename = %upload.original_filename,
        "Upload recorded"
    );

    Ok(Redirect::to("/"))
}
