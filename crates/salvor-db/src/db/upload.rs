use chrono::Utc;
use salvor_core::{models::Upload, AppError};
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

/// Repository for uploaded disk images
#[derive(Clone)]
pub struct UploadRepository {
    pool: SqlitePool,
}

impl UploadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a freshly stored upload.
    ///
    /// `original_filename` is stored exactly as the client sent it.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "insert"))]
    pub async fn create_upload(
        &self,
        original_filename: &str,
        file_path: &str,
    ) -> Result<Upload, AppError> {
        let upload = Upload {
            id: Uuid::new_v4(),
            original_filename: original_filename.to_string(),
            file_path: file_path.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO uploads (id, original_filename, file_path, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(upload.id)
        .bind(&upload.original_filename)
        .bind(&upload.file_path)
        .bind(upload.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(upload_id = %upload.id, "Upload recorded");

        Ok(upload)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select", db.record_id = %id))]
    pub async fn get_upload(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        let upload = sqlx::query_as::<Sqlite, Upload>(
            "SELECT id, original_filename, file_path, created_at FROM uploads WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(upload)
    }

    /// All uploads, oldest first
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select"))]
    pub async fn list_uploads(&self) -> Result<Vec<Upload>, AppError> {
        let uploads = sqlx::query_as::<Sqlite, Upload>(
            "SELECT id, original_filename, file_path, created_at FROM uploads ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(uploads)
    }

    /// Remove the upload row only.
    ///
    /// Recovered files, their rows, the stored image and the tool log are
    /// left untouched. Returns whether a row was removed.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_upload(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    #[tokio::test]
    async fn test_create_and_get_upload() {
        let pool = connect_in_memory().await.unwrap();
        let repo = UploadRepository::new(pool);

        let created = repo
            .create_upload("../weird name <disk>.img", "/data/uploads/1-abc-disk.img")
            .await
            .unwrap();

        let fetched = repo.get_upload(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.original_filename, "../weird name <disk>.img");
        assert_eq!(fetched.file_path, "/data/uploads/1-abc-disk.img");
    }

    #[tokio::test]
    async fn test_get_unknown_upload_returns_none() {
        let pool = connect_in_memory().await.unwrap();
        let repo = UploadRepository::new(pool);

        assert!(repo.get_upload(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let pool = connect_in_memory().await.unwrap();
        let repo = UploadRepository::new(pool);

        let first = repo.create_upload("a.img", "/u/a.img").await.unwrap();
        let second = repo.create_upload("b.img", "/u/b.img").await.unwrap();

        let all = repo.list_uploads().await.unwrap();
        assert_eq!(all.len(), 2);

        assert!(repo.delete_upload(first.id).await.unwrap());
        assert!(!repo.delete_upload(first.id).await.unwrap());

        let remaining = repo.list_uploads().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
    }
}
