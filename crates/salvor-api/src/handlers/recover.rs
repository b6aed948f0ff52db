use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use std::sync::Arc;
use uuid::Uuid;

/// Run the recovery tool against an upload and harvest its output.
///
/// The request is held open for the whole run, including the harvest delay.
#[tracing::instrument(skip(state), fields(upload_id = %id, operation = "recover_upload"))]
pub async fn recover_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, HttpAppError> {
    let report = state.recovery.run(id).await?;

    tracing::info!(files = report.files.len(), "Recovery finished");

    Ok(Redirect::to(&format!("/results/{}", id)))
}
