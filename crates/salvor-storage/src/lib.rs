//! Salvor Storage Library
//!
//! Filesystem layout for recovery jobs. Everything lives under one data
//! directory:
//!
//! - `uploads/`: stored disk images, named `<unix-millis>-<short-id>-<sanitized name>`
//! - `temp/<upload_id>/`: scratch output directory handed to the recovery tool
//! - `recovered_files/<upload_id>/`: harvested files, flattened by base name
//! - `photorec_log_<upload_id>.txt`: captured tool output, one per run
//!
//! Client-supplied names never reach a path unsanitized. Download names are
//! rejected outright if they contain separators or `..`.

pub mod error;
pub mod local;
pub mod names;

pub use error::{StorageError, StorageResult};
pub use local::{JobDirs, LocalStorage};
