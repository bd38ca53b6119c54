//! Storage abstraction trait

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The worker only ever writes whole files, so the surface is small. Backends create the
/// target directory on demand and overwrite an existing file of the same name.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` to `directory/filename` and return the full path written.
    async fn store(&self, directory: &Path, filename: &str, data: Bytes)
        -> StorageResult<PathBuf>;

    /// Check if a file exists
    async fn exists(&self, path: &Path) -> StorageResult<bool>;
}
