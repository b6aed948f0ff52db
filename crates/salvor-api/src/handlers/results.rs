use crate::error::HttpAppError;
use crate::state::AppState;
use crate::views;
use axum::{
    extract::{Path, State},
    response::Html,
};
use salvor_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(skip(state), fields(upload_id = %upload_id, operation = "show_results"))]
pub async fn show_results(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<Uuid>,
) -> Result<Html<String>, HttpAppError> {
    let files = state.db.recovered_files.list_for_upload(upload_id).await?;

    // Rows outlive their upload, so only a job with neither is unknown.
    if files.is_empty() && state.db.uploads.get_upload(upload_id).await?.is_none() {
        return Err(AppError::NotFound("Upload not found".to_string()).into());
    }

    Ok(Html(views::render_results(upload_id, &files)))
}
