//! Filename rules for stored uploads and downloadable files.

use crate::error::{StorageError, StorageResult};
use chrono::Utc;
use uuid::Uuid;

const MAX_FILENAME_LENGTH: usize = 100;

/// Reduce a client-supplied name to a safe base name.
///
/// Both `/` and `\` count as separators. Anything outside `[A-Za-z0-9._-]`
/// becomes `_` and leading dots are dropped, so the result never names a
/// parent directory or a hidden file.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized: String = sanitized
        .trim_start_matches('.')
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .collect();

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Unique on-disk name for an upload: `<unix-millis>-<short-id>-<sanitized name>`
pub fn upload_file_name(original_filename: &str) -> String {
    let short_id = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &short_id[..8],
        sanitize_filename(original_filename)
    )
}

/// Check that a name taken from a URL refers to a single directory entry.
///
/// With separators and NUL excluded, only `.` and `..` themselves can leave
/// the directory; names such as `report..v2.txt` are ordinary files.
pub fn validate_download_name(filename: &str) -> StorageResult<()> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::InvalidFilename(
            "Filename must be a single name without path separators".to_string(),
        ));
    }
    Ok(())
}
