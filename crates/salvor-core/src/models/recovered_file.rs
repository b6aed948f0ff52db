use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file harvested from the recovery tool's output for one upload.
///
/// `upload_id` is not enforced as a foreign key: deleting the owning upload
/// leaves these rows (and the files on disk) in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RecoveredFile {
    pub id: Uuid,
    pub upload_id: Uuid,
    pub filename: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}
