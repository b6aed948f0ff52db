use crate::clock::Sleeper;
use crate::error::RecoveryError;
use crate::harvest::{HarvestReport, Harvester};
use crate::invoker::RecoveryInvoker;
use salvor_core::Config;
use salvor_db::{RecoveredFileRepository, UploadRepository};
use salvor_storage::LocalStorage;
use std::sync::Arc;
use uuid::Uuid;

/// One recovery run for one upload: invoke the tool, then harvest on exit 0.
///
/// Nothing serializes runs. Two concurrent runs for the same upload share a
/// scratch directory and may both record the same files.
#[derive(Clone)]
pub struct RecoveryJob {
    uploads: UploadRepository,
    storage: LocalStorage,
    invoker: RecoveryInvoker,
    harvester: Harvester,
}

impl RecoveryJob {
    pub fn new(
        uploads: UploadRepository,
        storage: LocalStorage,
        invoker: RecoveryInvoker,
        harvester: Harvester,
    ) -> Self {
        Self {
            uploads,
            storage,
            invoker,
            harvester,
        }
    }

    pub fn from_config(
        config: &Config,
        uploads: UploadRepository,
        recovered_files: RecoveredFileRepository,
        storage: LocalStorage,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let invoker = RecoveryInvoker::from_config(config, storage.clone());
        let harvester = Harvester::new(
            storage.clone(),
            recovered_files,
            sleeper,
            config.harvest_delay(),
        );
        Self::new(uploads, storage, invoker, harvester)
    }

    #[tracing::instrument(skip(self), fields(upload_id = %upload_id))]
    pub async fn run(&self, upload_id: Uuid) -> Result<HarvestReport, RecoveryError> {
        let upload = self
            .uploads
            .get_upload(upload_id)
            .await?
            .ok_or(RecoveryError::UploadNotFound(upload_id))?;

        let dirs = self.storage.prepare_job_dirs(upload.id).await?;
        tracing::info!(
            scratch = %dirs.scratch.display(),
            recovered = %dirs.recovered.display(),
            "Job directories ready"
        );

        let outcome = self
            .invoker
            .run(upload.id, &dirs.scratch, upload.path())
            .await?;

        if !outcome.succeeded() {
            tracing::error!(exit_code = ?outcome.exit_code, "Recovery tool failed");
            return Err(RecoveryError::Failed {
                code: outcome.exit_code,
                log: outcome.log,
            });
        }

        self.harvester.harvest(&upload).await
    }
}
