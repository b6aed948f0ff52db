use crate::error::HttpAppError;
use crate::state::AppState;
use crate::views;
use axum::{extract::State, response::Html};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(skip(state), fields(operation = "list_uploads"))]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, HttpAppError> {
    let uploads = state.db.uploads.list_uploads().await?;
    let recovered: HashSet<Uuid> = state
        .db
        .recovered_files
        .distinct_upload_ids()
        .await?
        .into_iter()
        .collect();

    tracing::debug!(
        uploads = uploads.len(),
        recovered = recovered.len(),
        "Rendering home page"
    );

    Ok(Html(views::render_home(&uploads, &recovered)))
}
