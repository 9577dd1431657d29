//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod health;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use filmroom_core::Config;
use filmroom_processing::{FfmpegTranscoder, IngestionPipeline, RandomScorer, StageStore};
use filmroom_storage::create_storage;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    let storage = create_storage(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    let stage = StageStore::new(config.staging_dir.clone())
        .await
        .context("Failed to create staging directory")?;

    let transcoder = Arc::new(FfmpegTranscoder::new(
        config.ffmpeg_path.clone(),
        config.ffprobe_path.clone(),
        Duration::from_secs(config.transcode_timeout_secs),
    ));

    let pipeline = Arc::new(IngestionPipeline::new(
        stage,
        transcoder,
        storage.clone(),
        Arc::new(RandomScorer::new()),
        config.max_video_size_bytes,
    ));

    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
        storage,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
