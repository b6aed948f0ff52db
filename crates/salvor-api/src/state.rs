//! Application state shared by all handlers.
//!
//! Built once at startup from the configuration, the pool and the storage
//! layout. Handlers extract it as `State<Arc<AppState>>`.

use salvor_core::Config;
use salvor_db::{RecoveredFileRepository, UploadRepository};
use salvor_recovery::{RecoveryJob, Sleeper};
use salvor_storage::LocalStorage;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Pool and repositories
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub uploads: UploadRepository,
    pub recovered_files: RecoveredFileRepository,
}

impl DbState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            uploads: UploadRepository::new(pool.clone()),
            recovered_files: RecoveredFileRepository::new(pool.clone()),
            pool,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub storage: LocalStorage,
    pub recovery: RecoveryJob,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: SqlitePool,
        storage: LocalStorage,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let db = DbState::new(pool);
        let recovery = RecoveryJob::from_config(
            &config,
            db.uploads.clone(),
            db.recovered_files.clone(),
            storage.clone(),
            sleeper,
        );

        Self {
            config,
            db,
            storage,
            recovery,
        }
    }
}
