pub mod recovered_file;
pub mod upload;

pub use recovered_file::RecoveredFile;
pub use upload::Upload;
