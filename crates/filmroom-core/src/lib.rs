//! Filmroom Core Library
//!
//! Shared foundation for the filmroom video ingestion service: configuration,
//! the unified error taxonomy, and the domain models that cross crate
//! boundaries.

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AnalysisResult, VideoRef, SCORE_MAX, SCORE_MIN};
