use chrono::Utc;
use salvor_core::{models::RecoveredFile, AppError};
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

/// Repository for files harvested out of a recovery run
#[derive(Clone)]
pub struct RecoveredFileRepository {
    pool: SqlitePool,
}

impl RecoveredFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "recovered_files", db.operation = "insert"))]
    pub async fn create_recovered_file(
        &self,
        upload_id: Uuid,
        filename: &str,
        file_path: &str,
    ) -> Result<RecoveredFile, AppError> {
        let file = RecoveredFile {
            id: Uuid::new_v4(),
            upload_id,
            filename: filename.to_string(),
            file_path: file_path.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO recovered_files (id, upload_id, filename, file_path, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(file.id)
        .bind(file.upload_id)
        .bind(&file.filename)
        .bind(&file.file_path)
        .bind(file.created_at)
        .execute(&self.pool)
        .await?;

        Ok(file)
    }

    #[tracing::instrument(skip(self), fields(db.table = "recovered_files", db.operation = "select", upload_id = %upload_id))]
    pub async fn list_for_upload(&self, upload_id: Uuid) -> Result<Vec<RecoveredFile>, AppError> {
        let files = sqlx::query_as::<Sqlite, RecoveredFile>(
            r#"
            SELECT id, upload_id, filename, file_path, created_at
            FROM recovered_files
            WHERE upload_id = ?
            ORDER BY filename ASC
            "#,
        )
        .bind(upload_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Distinct upload ids that have at least one recovered file
    #[tracing::instrument(skip(self), fields(db.table = "recovered_files", db.operation = "select"))]
    pub async fn distinct_upload_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<Sqlite, Uuid>("SELECT DISTINCT upload_id FROM recovered_files")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    #[tracing::instrument(skip(self), fields(db.table = "recovered_files", db.operation = "count", upload_id = %upload_id))]
    pub async fn count_for_upload(&self, upload_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Sqlite, i64>(
            "SELECT COUNT(*) FROM recovered_files WHERE upload_id = ?",
        )
        .bind(upload_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
