use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use std::sync::Arc;
use uuid::Uuid;

/// Remove the upload record only. Recovered files, their rows, the log and the
/// stored image all stay.
#[tracing::instrument(skip(state), fields(upload_id = %id, operation = "delete_upload"))]
pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, HttpAppError> {
    let deleted = state.db.uploads.delete_upload(id).await?;

    if deleted {
        tracing::info!("Upload deleted");
    } else {
        tracing::debug!("Delete requested for unknown upload");
    }

    Ok(Redirect::to("/"))
}
