//! Collects the files the recovery tool left in a job's scratch directory.

use crate::clock::Sleeper;
use crate::error::RecoveryError;
use salvor_core::models::{RecoveredFile, Upload};
use salvor_db::RecoveredFileRepository;
use salvor_storage::LocalStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

/// Files recorded by one harvest
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub files: Vec<RecoveredFile>,
}

#[derive(Clone)]
pub struct Harvester {
    storage: LocalStorage,
    recovered_files: RecoveredFileRepository,
    sleeper: Arc<dyn Sleeper>,
    delay: Duration,
}

impl Harvester {
    pub fn new(
        storage: LocalStorage,
        recovered_files: RecoveredFileRepository,
        sleeper: Arc<dyn Sleeper>,
        delay: Duration,
    ) -> Self {
        Self {
            storage,
            recovered_files,
            sleeper,
            delay,
        }
    }

    /// Move every file under the upload's scratch directory into its recovered
    /// directory and record one row per file.
    ///
    /// With nothing to harvest, fails with [`RecoveryError::NothingRecovered`]
    /// and leaves the scratch directory and the upload in place. A failure part
    /// way through leaves whatever was already moved and recorded. On success
    /// the upload's stored file and the scratch directory are removed.
    #[tracing::instrument(skip(self, upload), fields(upload_id = %upload.id))]
    pub async fn harvest(&self, upload: &Upload) -> Result<HarvestReport, RecoveryError> {
        self.sleeper.sleep(self.delay).await;

        let scratch = self.storage.scratch_dir(upload.id);
        let found = scan_files(scratch.clone()).await?;
        tracing::info!(count = found.len(), "Scanned recovery output");

        if found.is_empty() {
            tracing::warn!(scratch = %scratch.display(), "No files recovered");
            return Err(RecoveryError::NothingRecovered);
        }

        let mut files = Vec::with_capacity(found.len());
        for source in &found {
            let (filename, destination) =
                self.storage.move_into_recovered(upload.id, source).await?;
            tracing::debug!(
                from = %source.display(),
                to = %destination.display(),
                "Moved recovered file"
            );

            let record = self
                .recovered_files
                .create_recovered_file(upload.id, &filename, &destination.to_string_lossy())
                .await?;
            files.push(record);
        }

        self.storage.remove_upload(upload.path()).await?;
        self.storage.remove_scratch(upload.id).await?;

        tracing::info!(count = files.len(), "Harvest complete, scratch removed");

        Ok(HarvestReport { files })
    }
}

/// Every regular file below `root`, depth first. A missing root yields nothing.
async fn scan_files(root: PathBuf) -> Result<Vec<PathBuf>, RecoveryError> {
    tokio::task::spawn_blocking(move || walk(&root))
        .await
        .map_err(|e| RecoveryError::Scan(format!("Scan task failed: {}", e)))?
}

fn walk(root: &Path) -> Result<Vec<PathBuf>, RecoveryError> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| RecoveryError::Scan(e.to_string()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
