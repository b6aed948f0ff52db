//! Salvor Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every Salvor component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, RecoveryConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{RecoveredFile, Upload};
