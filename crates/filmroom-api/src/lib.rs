//! Filmroom API Library
//!
//! This crate provides the HTTP handlers and application setup for the
//! ingestion service.

mod api_doc;

// Public modules
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::ErrorResponse;
pub use state::AppState;
