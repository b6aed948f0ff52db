//! Shell scripts standing in for the recovery binary

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("photorec-stub.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("Failed to write stub");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to mark stub executable");
    path
}

/// Writes `count` files spread over two `recup_dir.N` directories under `$3`
pub fn writes_files(count: usize) -> String {
    let mut body = String::from("mkdir -p \"$3/recup_dir.1\" \"$3/recup_dir.2\"\n");
    for i in 0..count {
        body.push_str(&format!(
            "echo 'recovered {i}' > \"$3/recup_dir.{dir}/f{i:04}.jpg\"\n",
            dir = i % 2 + 1,
        ));
    }
    body.push_str(&format!("echo 'PhotoRec finished: {count} files'\n"));
    body
}

pub const FAILS: &str = "echo 'opening image'\necho 'cannot read partition table' >&2\nexit 3\n";

pub const WRITES_NOTHING: &str = "mkdir -p \"$3/recup_dir.1\"\necho 'nothing found'\n";
