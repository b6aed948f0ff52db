//! Salvor API Library
//!
//! Browser-facing routes for uploading disk images, running recovery against
//! them, and browsing or downloading what was recovered.

mod handlers;
mod utils;
mod views;

pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
