//! Test helpers: build AppState and router for integration tests.
//!
//! Each app gets its own temporary data directory and in-memory database.
//! Run with `cargo test -p salvor-api`.

#![allow(dead_code)]

pub mod fixtures;
#[cfg(unix)]
pub mod stub;

use axum_test::TestServer;
use salvor_api::setup::routes;
use salvor_api::state::AppState;
use salvor_core::{BaseConfig, Config, RecoveryConfig};
use salvor_recovery::ImmediateSleeper;
use salvor_storage::LocalStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Upload limit used by every test app
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn data_dir(&self) -> &Path {
        self.state.storage.base_path()
    }

    /// Directory for stub scripts, outside the data directory
    pub fn bin_dir(&self) -> PathBuf {
        self._temp_dir.path().join("bin")
    }
}

fn test_config(data_dir: PathBuf, photorec_path: &str) -> Config {
    Config(Box::new(RecoveryConfig {
        base: BaseConfig {
            server_port: 0,
            environment: "test".to_string(),
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 5,
        },
        data_dir,
        photorec_path: photorec_path.to_string(),
        photorec_log_flag: "/log".to_string(),
        photorec_dest_flag: "/d".to_string(),
        harvest_delay_secs: 0,
        recovery_timeout_secs: Some(30),
        max_upload_size_bytes: TEST_MAX_UPLOAD_BYTES,
    }))
}

/// Setup a test app whose recovery tool is the script with the given body.
///
/// The script sees `<log-flag> <dest-flag> <scratch-dir> <source-file>`, so
/// the scratch directory is `$3`.
#[cfg(unix)]
pub async fn setup_test_app_with_stub(body: &str) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::create_dir_all(temp_dir.path().join("bin")).expect("Failed to create bin dir");
    let stub = stub::write_stub(&temp_dir.path().join("bin"), body);
    build(temp_dir, &stub.to_string_lossy()).await
}

/// Setup a test app pointing at a recovery binary that does not exist.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("bin").join("photorec-missing");
    build(temp_dir, &missing.to_string_lossy()).await
}

async fn build(temp_dir: TempDir, photorec_path: &str) -> TestApp {
    let config = test_config(temp_dir.path().join("data"), photorec_path);

    let storage = LocalStorage::new(config.data_dir())
        .await
        .expect("Failed to create storage");
    let pool = salvor_db::connect_in_memory()
        .await
        .expect("Failed to open database");

    let state = Arc::new(AppState::new(
        config.clone(),
        pool,
        storage,
        Arc::new(ImmediateSleeper),
    ));

    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
