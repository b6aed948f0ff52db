use crate::error::{StorageError, StorageResult};
use crate::names::{upload_file_name, validate_download_name};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

const UPLOADS_DIR: &str = "uploads";
const SCRATCH_DIR: &str = "temp";
const RECOVERED_DIR: &str = "recovered_files";

/// Per-job directories created before the recovery tool runs
#[derive(Debug, Clone)]
pub struct JobDirs {
    /// Output directory handed to the tool, removed after a successful harvest
    pub scratch: PathBuf,
    /// Durable home of harvested files
    pub recovered: PathBuf,
}

/// Local filesystem layout rooted at the data directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Data directory holding uploads, scratch and recovered files
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        for dir in [UPLOADS_DIR, SCRATCH_DIR, RECOVERED_DIR] {
            let path = base_path.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.base_path.join(UPLOADS_DIR)
    }

    pub fn scratch_dir(&self, upload_id: Uuid) -> PathBuf {
        self.base_path.join(SCRATCH_DIR).join(upload_id.to_string())
    }

    pub fn recovered_dir(&self, upload_id: Uuid) -> PathBuf {
        self.base_path.join(RECOVERED_DIR).join(upload_id.to_string())
    }

    pub fn log_path(&self, upload_id: Uuid) -> PathBuf {
        self.base_path.join(format!("photorec_log_{}.txt", upload_id))
    }

    /// Stream an upload body to a fresh file under `uploads/`.
    ///
    /// The on-disk name is derived from `original_filename` but made unique
    /// and safe. A partially written file is removed if the stream fails.
    pub async fn store_upload_stream<R>(
        &self,
        original_filename: &str,
        mut reader: R,
    ) -> StorageResult<PathBuf>
    where
        R: AsyncRead + Send + Unpin,
    {
        let dir = self.uploads_dir();
        fs::create_dir_all(&dir).await?;

        let path = dir.join(upload_file_name(original_filename));
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = match tokio::io::copy(&mut reader, &mut file).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    tracing::warn!(
                        path = %path.display(),
                        error = %cleanup,
                        "Failed to remove partial upload"
                    );
                }
                return Err(StorageError::StreamFailed(e));
            }
        };

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        Ok(path)
    }

    /// Create the scratch and recovered directories for a job. Idempotent.
    pub async fn prepare_job_dirs(&self, upload_id: Uuid) -> StorageResult<JobDirs> {
        let dirs = JobDirs {
            scratch: self.scratch_dir(upload_id),
            recovered: self.recovered_dir(upload_id),
        };

        fs::create_dir_all(&dirs.scratch).await?;
        fs::create_dir_all(&dirs.recovered).await?;

        Ok(dirs)
    }

    /// Persist the captured tool output for a job, replacing any earlier log.
    pub async fn write_log(&self, upload_id: Uuid, contents: &[u8]) -> StorageResult<PathBuf> {
        let path = self.log_path(upload_id);
        fs::write(&path, contents).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write log {}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    /// Move a harvested file into the job's recovered directory by base name.
    ///
    /// An existing file with the same name is replaced. Returns the base name
    /// and the destination path.
    pub async fn move_into_recovered(
        &self,
        upload_id: Uuid,
        source: &Path,
    ) -> StorageResult<(String, PathBuf)> {
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                StorageError::MoveFailed(format!("No file name in {}", source.display()))
            })?;

        let destination = self.recovered_dir(upload_id).join(&filename);

        if let Err(rename_err) = fs::rename(source, &destination).await {
            // Scratch and recovered directories may sit on different mounts
            fs::copy(source, &destination).await.map_err(|e| {
                StorageError::MoveFailed(format!(
                    "Failed to move {} to {}: {} (copy fallback: {})",
                    source.display(),
                    destination.display(),
                    rename_err,
                    e
                ))
            })?;
            fs::remove_file(source).await?;
        }

        Ok((filename, destination))
    }

    /// Remove a stored upload. A file that is already gone is not an error.
    pub async fn remove_upload(&self, path: &Path) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Upload already removed");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Recursively remove a job's scratch directory.
    pub async fn remove_scratch(&self, upload_id: Uuid) -> StorageResult<()> {
        let path = self.scratch_dir(upload_id);
        match fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Path of a downloadable file, after rejecting names that could leave
    /// the job's recovered directory.
    pub fn recovered_file_path(&self, upload_id: Uuid, filename: &str) -> StorageResult<PathBuf> {
        validate_download_name(filename)?;
        Ok(self.recovered_dir(upload_id).join(filename))
    }

    /// Open a recovered file for streaming. Returns the stream and its length.
    pub async fn download_stream(
        &self,
        upload_id: Uuid,
        filename: &str,
    ) -> StorageResult<(ReaderStream<fs::File>, u64)> {
        let path = self.recovered_file_path(upload_id, filename)?;

        let metadata = match fs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(StorageError::NotFound(path.display().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to stat {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), size_bytes = metadata.len(), "Streaming recovered file");

        Ok((ReaderStream::new(file), metadata.len()))
    }
}
