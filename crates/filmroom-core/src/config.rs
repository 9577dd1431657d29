//! Configuration module
//!
//! Environment-driven configuration for the ingestion service. Every knob has
//! a default suitable for local development; `validate()` runs at startup and
//! fails fast on contradictory settings.

use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_VIDEO_SIZE_MB: usize = 100;
const DEFAULT_TRANSCODE_TIMEOUT_SECS: u64 = 300;

/// Which object-store backend the service runs against.
///
/// `Disabled` is the degraded mode used when no remote store is configured:
/// uploads still flow through the full pipeline, but the put/delete steps
/// become logged no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
    Disabled,
}

/// Application configuration for the ingestion service.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,

    // Upload limits
    pub max_video_size_bytes: usize,

    // Staging
    pub staging_dir: PathBuf,

    // Transcoder
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub transcode_timeout_secs: u64,

    // Object storage
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend =
            env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| match s.to_lowercase().as_str() {
                    "s3" => Some(StorageBackend::S3),
                    "local" => Some(StorageBackend::Local),
                    "disabled" => Some(StorageBackend::Disabled),
                    _ => None,
                });

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            max_video_size_bytes: env::var("MAX_VIDEO_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_VIDEO_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(DEFAULT_MAX_VIDEO_SIZE_MB)
                * 1024
                * 1024,
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("filmroom-staging")),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            transcode_timeout_secs: env::var("TRANSCODE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_TRANSCODE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_TRANSCODE_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than 0"));
        }

        if self.storage_backend == Some(StorageBackend::S3) && self.s3_bucket.is_none() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=s3 requires S3_BUCKET to be set"
            ));
        }

        if self.transcode_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "TRANSCODE_TIMEOUT_SECS must be greater than 0"
            ));
        }

        Ok(())
    }
}
