use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script standing in for the recovery tool.
///
/// The script receives `<log-flag> <dest-flag> <scratch-dir> <source-file>`.
pub(crate) fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join(format!("photorec-stub-{}.sh", uuid::Uuid::new_v4().simple()));
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
