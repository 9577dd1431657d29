//! Filmroom Storage Library
//!
//! Object-store abstraction for the ingestion pipeline. The `Storage` trait
//! covers the three operations the pipeline needs (put, delete, exists);
//! backends exist for S3-compatible stores, the local filesystem, and a
//! disabled no-op mode used when no remote store is configured.
//!
//! # Storage key format
//!
//! The pipeline stores each normalized derivative under `videos/{id}.mp4`,
//! where `{id}` is the per-request UUID. Keys must not contain `..` or a
//! leading `/`.

pub mod disabled;
pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use disabled::DisabledStorage;
pub use factory::create_storage;
pub use filmroom_core::StorageBackend;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
