//! Transcoder adapter - ffmpeg normalization and ffprobe metadata extraction.
//!
//! The transcode policy is fixed and not configurable per call: MP4
//! container, libx264 at a constant-rate-factor quality target, AAC audio
//! at a fixed bitrate. A bounded timeout wraps the whole invocation; there
//! are no retries. Any transcoder problem (bad input, process crash,
//! timeout) surfaces as a [`TranscodeError`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

// Fixed output policy: bounded file size and predictable latency.
const VIDEO_CODEC: &str = "libx264";
const VIDEO_CRF: &str = "26";
const VIDEO_PRESET: &str = "fast";
const AUDIO_CODEC: &str = "aac";
const AUDIO_BITRATE: &str = "128k";

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Transcoder exited with failure: {0}")]
    Failed(String),

    #[error("Transcode timed out after {0}s")]
    TimedOut(u64),

    #[error("Input is not a readable video: {0}")]
    UnreadableInput(String),

    #[error("Failed to run transcoder: {0}")]
    Io(#[from] std::io::Error),
}

/// Basic stream metadata from ffprobe.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
}

/// Seam for the external transcoding tool.
///
/// The production implementation shells out to ffmpeg; tests substitute a
/// mock. One call, one completion signal: an output path or a diagnostic.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Probe the input's stream metadata; failure means the input is not a
    /// video this pipeline can process.
    async fn probe(&self, input: &Path) -> Result<VideoMetadata, TranscodeError>;

    /// Transcode `input` to the fixed normalized format, writing the
    /// derivative under `output_dir` with a name scoped to `id`.
    async fn transcode(
        &self,
        input: &Path,
        output_dir: &Path,
        id: Uuid,
    ) -> Result<PathBuf, TranscodeError>;
}

/// ffmpeg-backed transcoder with the fixed normalization policy.
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String, ffprobe_path: String, timeout: Duration) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            timeout,
        }
    }

    fn build_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            VIDEO_CODEC.to_string(),
            "-preset".to_string(),
            VIDEO_PRESET.to_string(),
            "-crf".to_string(),
            VIDEO_CRF.to_string(),
            "-c:a".to_string(),
            AUDIO_CODEC.to_string(),
            "-b:a".to_string(),
            AUDIO_BITRATE.to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe(&self, input: &Path) -> Result<VideoMetadata, TranscodeError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::UnreadableInput(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        parse_probe_output(&output.stdout)
    }

    #[tracing::instrument(skip(self, input, output_dir), fields(id = %id))]
    async fn transcode(
        &self,
        input: &Path,
        output_dir: &Path,
        id: Uuid,
    ) -> Result<PathBuf, TranscodeError> {
        let output_path = output_dir.join(format!("{}_normalized.mp4", id));
        let args = Self::build_args(input, &output_path);

        let start = std::time::Instant::now();

        let run = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result?,
            // Dropping the future kills the ffmpeg child (kill_on_drop).
            Err(_) => {
                tracing::warn!(
                    id = %id,
                    timeout_secs = self.timeout.as_secs(),
                    "Transcode timed out, killing ffmpeg"
                );
                return Err(TranscodeError::TimedOut(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::Failed(stderr.trim().to_string()));
        }

        tracing::info!(
            id = %id,
            output = %output_path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Transcode successful"
        );

        Ok(output_path)
    }
}

fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata, TranscodeError> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| TranscodeError::UnreadableInput(format!("bad ffprobe output: {}", e)))?;

    let stream = probe_data["streams"]
        .get(0)
        .ok_or_else(|| TranscodeError::UnreadableInput("no video stream found".to_string()))?;

    let duration_secs = probe_data["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let width = stream["width"].as_u64().unwrap_or(0) as u32;
    let height = stream["height"].as_u64().unwrap_or(0) as u32;

    Ok(VideoMetadata {
        duration_secs,
        width,
        height,
    })
}
