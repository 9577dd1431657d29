//! Filmroom Processing Library
//!
//! The ingestion pipeline and its building blocks: the temporary stage store,
//! the ffmpeg transcoder adapter, the scoring backend seam, and the
//! orchestrator that drives one upload through all of them with guaranteed
//! cleanup.

pub mod pipeline;
pub mod scoring;
pub mod stage;
pub mod transcode;

pub use pipeline::{IngestionPipeline, PipelineError};
pub use scoring::{RandomScorer, Scorer, ScoringError};
pub use stage::{StageStore, StagedFile};
pub use transcode::{FfmpegTranscoder, TranscodeError, Transcoder, VideoMetadata};
