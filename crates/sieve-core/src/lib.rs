//! Sieve Core Library
//!
//! This crate provides the domain models, error types, configuration and filename
//! validation shared by every Sieve component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, IngestConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{FilenamePolicy, UploadStatus, UploadTask};
