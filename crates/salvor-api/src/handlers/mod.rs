pub mod delete;
pub mod download;
pub mod home;
pub mod recover;
pub mod results;
pub mod upload;
