use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// A disk image submitted by a user, awaiting or having undergone recovery.
///
/// `original_filename` is the client-supplied name, stored verbatim and never
/// used to build filesystem paths. `file_path` is where the bytes live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Upload {
    pub id: Uuid,
    pub original_filename: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

impl Upload {
    pub fn path(&self) -> &Path {
        Path::new(&self.file_path)
    }
}
