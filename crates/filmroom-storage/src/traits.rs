//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement.

use async_trait::async_trait;
use filmroom_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem, disabled) must implement this
/// trait so the ingestion pipeline can work with any backend without coupling
/// to implementation details.
///
/// Operations are addressed by key; the bucket (or its filesystem equivalent)
/// belongs to the backend's construction and is exposed via [`Storage::bucket`]
/// so callers can log full `(bucket, key)` object references. Every operation
/// is a single attempt — retry policy is deliberately left to callers.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload data under the given key and return the object's public URL.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Delete the object under the given key.
    ///
    /// Deleting a nonexistent object is not an error. Real failures are
    /// surfaced so the caller can log them, even when it treats the delete
    /// as best-effort.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists under the given key.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Bucket (or equivalent container) this backend writes to.
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
