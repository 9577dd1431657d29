//! HTTP request handlers.

pub mod videos;
