//! Database repositories
//!
//! `UploadRepository` is written only by the upload intake and the delete
//! route. `RecoveredFileRepository` is written only by the harvest step.
//! Both are read by the presentation layer.

pub mod recovered_file;
pub mod upload;

pub use recovered_file::RecoveredFileRepository;
pub use upload::UploadRepository;
