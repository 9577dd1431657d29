//! Ingestion pipeline orchestration: stage → transcode → upload → score → cleanup.
//!
//! The pipeline is a strictly sequential chain of async operations with one
//! correctness property above all: every staged file and every stored object
//! created for a request is removed by the time `process_upload` returns,
//! on success and on every failure path. Cleanup is a single unconditional
//! guard around the fallible stages rather than per-branch calls, and each
//! release is best-effort — a failed delete is logged, never escalated.

use bytes::Bytes;
use filmroom_core::{AnalysisResult, VideoRef};
use filmroom_storage::{Storage, StorageError};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::scoring::{Scorer, ScoringError};
use crate::stage::{StageStore, StagedFile};
use crate::transcode::{TranscodeError, Transcoder};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Staging failed")]
    StagingFailed(#[source] std::io::Error),

    #[error("Transcode failed")]
    TranscodeFailed(#[from] TranscodeError),

    #[error("Storage upload failed")]
    StorageUploadFailed(#[source] StorageError),

    #[error("Scoring failed")]
    ScoringFailed(#[from] ScoringError),
}

/// Resources acquired by one request that must be released before returning.
///
/// Fields are filled in as the stages run; `release` consumes whatever was
/// actually acquired, so the cleanup code is identical for every exit path.
struct RequestResources {
    input: PathBuf,
    transcoded: Option<PathBuf>,
    object_key: Option<String>,
}

/// Drives one upload through the full ingestion chain.
pub struct IngestionPipeline {
    stage: StageStore,
    transcoder: Arc<dyn Transcoder>,
    storage: Arc<dyn Storage>,
    scorer: Arc<dyn Scorer>,
    max_payload_bytes: usize,
}

impl IngestionPipeline {
    pub fn new(
        stage: StageStore,
        transcoder: Arc<dyn Transcoder>,
        storage: Arc<dyn Storage>,
        scorer: Arc<dyn Scorer>,
        max_payload_bytes: usize,
    ) -> Self {
        Self {
            stage,
            transcoder,
            storage,
            scorer,
            max_payload_bytes,
        }
    }

    /// Process one uploaded video and return its analysis result.
    ///
    /// Validation happens before anything is acquired; from the moment the
    /// input is staged, cleanup runs no matter how the remaining stages end.
    pub async fn process_upload(
        &self,
        payload: Bytes,
        content_type: &str,
    ) -> Result<AnalysisResult, PipelineError> {
        if payload.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Video file is empty".to_string(),
            ));
        }
        if payload.len() > self.max_payload_bytes {
            return Err(PipelineError::InvalidInput(format!(
                "Video file is too large: {} bytes (max: {} bytes)",
                payload.len(),
                self.max_payload_bytes
            )));
        }

        let id = Uuid::new_v4();

        tracing::info!(
            id = %id,
            content_type = %content_type,
            size_bytes = payload.len(),
            "Starting video ingestion"
        );

        let staged_input = self
            .stage
            .stage(id, &payload, "input")
            .await
            .map_err(PipelineError::StagingFailed)?;

        let mut resources = RequestResources {
            input: staged_input.path.clone(),
            transcoded: None,
            object_key: None,
        };

        let outcome = self.run_stages(id, &staged_input, &mut resources).await;
        self.release(id, resources).await;

        match &outcome {
            Ok(result) => {
                tracing::info!(
                    id = %id,
                    accuracy = result.accuracy,
                    speed = result.speed,
                    technique = result.technique,
                    "Video ingestion completed"
                );
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, "Video ingestion failed");
            }
        }

        outcome
    }

    /// The fallible middle of the pipeline. Acquired resources are recorded
    /// in `resources` as a side effect so the caller can release them.
    async fn run_stages(
        &self,
        id: Uuid,
        input: &StagedFile,
        resources: &mut RequestResources,
    ) -> Result<AnalysisResult, PipelineError> {
        let metadata = self.transcoder.probe(&input.path).await?;
        tracing::info!(
            id = %id,
            duration_secs = metadata.duration_secs,
            resolution = %format!("{}x{}", metadata.width, metadata.height),
            "Probed uploaded video"
        );

        let transcoded_path = self
            .transcoder
            .transcode(&input.path, self.stage.base_dir(), id)
            .await?;
        resources.transcoded = Some(transcoded_path.clone());

        let transcoded_bytes = tokio::fs::read(&transcoded_path)
            .await
            .map_err(PipelineError::StagingFailed)?;

        let key = format!("videos/{}.mp4", id);
        let url = self
            .storage
            .put(&key, transcoded_bytes, "video/mp4")
            .await
            .map_err(PipelineError::StorageUploadFailed)?;
        resources.object_key = Some(key.clone());

        tracing::info!(
            id = %id,
            bucket = %self.storage.bucket(),
            key = %key,
            "Uploaded normalized video to object storage"
        );

        let video_ref = VideoRef {
            key,
            url: Some(url),
        };
        let result = self.scorer.score(&video_ref, id).await?;

        Ok(result)
    }

    /// Release everything the request acquired.
    ///
    /// The stored-object delete and the staged-file removals have no ordering
    /// dependency, so they are issued concurrently; all are attempted before
    /// this returns and none can fail the request.
    async fn release(&self, id: Uuid, resources: RequestResources) {
        let delete_object = async {
            if let Some(key) = &resources.object_key {
                if let Err(e) = self.storage.delete(key).await {
                    tracing::warn!(
                        id = %id,
                        error = %e,
                        bucket = %self.storage.bucket(),
                        key = %key,
                        "Failed to delete stored object during cleanup"
                    );
                }
            }
        };

        let remove_input = self.stage.remove(&resources.input);

        let remove_transcoded = async {
            if let Some(path) = &resources.transcoded {
                self.stage.remove(path).await;
            }
        };

        tokio::join!(delete_object, remove_input, remove_transcoded);

        tracing::debug!(id = %id, "Request resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RandomScorer;
    use crate::transcode::VideoMetadata;
    use async_trait::async_trait;
    use filmroom_core::StorageBackend;
    use filmroom_storage::StorageResult;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Copies the staged input as the "normalized" output.
    struct CopyTranscoder;

    #[async_trait]
    impl Transcoder for CopyTranscoder {
        async fn probe(&self, _input: &Path) -> Result<VideoMetadata, TranscodeError> {
            Ok(VideoMetadata {
                duration_secs: 2.0,
                width: 1280,
                height: 720,
            })
        }

        async fn transcode(
            &self,
            input: &Path,
            output_dir: &Path,
            id: Uuid,
        ) -> Result<PathBuf, TranscodeError> {
            let output = output_dir.join(format!("{}_normalized.mp4", id));
            tokio::fs::copy(input, &output).await?;
            Ok(output)
        }
    }

    /// Probes fine, then fails the transcode itself.
    struct FailingTranscoder;

    #[async_trait]
    impl Transcoder for FailingTranscoder {
        async fn probe(&self, _input: &Path) -> Result<VideoMetadata, TranscodeError> {
            Ok(VideoMetadata {
                duration_secs: 2.0,
                width: 1280,
                height: 720,
            })
        }

        async fn transcode(
            &self,
            _input: &Path,
            _output_dir: &Path,
            _id: Uuid,
        ) -> Result<PathBuf, TranscodeError> {
            Err(TranscodeError::Failed("simulated encoder crash".to_string()))
        }
    }

    /// Records every put/delete; can be told to reject puts.
    #[derive(Default)]
    struct SpyStorage {
        puts: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
        fail_puts: bool,
    }

    impl SpyStorage {
        fn new() -> Self {
            Self::default()
        }

        fn failing() -> Self {
            Self {
                fail_puts: true,
                ..Self::default()
            }
        }

        fn puts(&self) -> Vec<String> {
            self.puts.lock().unwrap().clone()
        }

        fn deletes(&self) -> Vec<String> {
            self.deletes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Storage for SpyStorage {
        async fn put(
            &self,
            key: &str,
            _data: Vec<u8>,
            _content_type: &str,
        ) -> StorageResult<String> {
            if self.fail_puts {
                return Err(StorageError::UploadFailed("simulated outage".to_string()));
            }
            self.puts.lock().unwrap().push(key.to_string());
            Ok(format!("spy://{}", key))
        }

        async fn delete(&self, key: &str) -> StorageResult<()> {
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(())
        }

        async fn exists(&self, _key: &str) -> StorageResult<bool> {
            Ok(false)
        }

        fn bucket(&self) -> &str {
            "spy"
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Disabled
        }
    }

    /// Scorer that remembers whether it was ever called.
    struct TrackingScorer {
        called: AtomicBool,
    }

    impl TrackingScorer {
        fn new() -> Self {
            Self {
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Scorer for TrackingScorer {
        async fn score(
            &self,
            _video: &VideoRef,
            id: Uuid,
        ) -> Result<AnalysisResult, ScoringError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(AnalysisResult {
                id,
                accuracy: 80,
                speed: 80,
                technique: 80,
            })
        }
    }

    fn staged_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    async fn pipeline_with(
        dir: &Path,
        transcoder: Arc<dyn Transcoder>,
        storage: Arc<dyn Storage>,
        scorer: Arc<dyn Scorer>,
    ) -> IngestionPipeline {
        let stage = StageStore::new(dir).await.unwrap();
        IngestionPipeline::new(stage, transcoder, storage, scorer, 10 * 1024 * 1024)
    }

    #[tokio::test]
    async fn test_successful_upload_scores_and_cleans_up() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SpyStorage::new());
        let pipeline = pipeline_with(
            dir.path(),
            Arc::new(CopyTranscoder),
            storage.clone(),
            Arc::new(RandomScorer::new()),
        )
        .await;

        let result = pipeline
            .process_upload(Bytes::from_static(b"fake mp4 bytes"), "video/mp4")
            .await
            .unwrap();

        assert!(result.scores_in_range());

        let expected_key = format!("videos/{}.mp4", result.id);
        assert_eq!(storage.puts(), vec![expected_key.clone()]);
        assert_eq!(storage.deletes(), vec![expected_key]);

        assert!(staged_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_empty_payload_rejected_before_staging() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SpyStorage::new());
        let pipeline = pipeline_with(
            dir.path(),
            Arc::new(CopyTranscoder),
            storage.clone(),
            Arc::new(RandomScorer::new()),
        )
        .await;

        let err = pipeline
            .process_upload(Bytes::new(), "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(storage.puts().is_empty());
        assert!(staged_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected_before_staging() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SpyStorage::new());
        let stage = StageStore::new(dir.path()).await.unwrap();
        let pipeline = IngestionPipeline::new(
            stage,
            Arc::new(CopyTranscoder),
            storage.clone(),
            Arc::new(RandomScorer::new()),
            16, // tiny ceiling for the test
        );

        let err = pipeline
            .process_upload(Bytes::from(vec![0u8; 17]), "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(storage.puts().is_empty());
        assert!(staged_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_transcode_failure_cleans_staged_input() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SpyStorage::new());
        let pipeline = pipeline_with(
            dir.path(),
            Arc::new(FailingTranscoder),
            storage.clone(),
            Arc::new(RandomScorer::new()),
        )
        .await;

        let err = pipeline
            .process_upload(Bytes::from_static(b"fake mp4 bytes"), "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::TranscodeFailed(_)));
        assert!(storage.puts().is_empty());
        assert!(staged_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_skips_scoring_and_cleans_up() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SpyStorage::failing());
        let scorer = Arc::new(TrackingScorer::new());
        let pipeline = pipeline_with(
            dir.path(),
            Arc::new(CopyTranscoder),
            storage.clone(),
            scorer.clone(),
        )
        .await;

        let err = pipeline
            .process_upload(Bytes::from_static(b"fake mp4 bytes"), "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::StorageUploadFailed(_)));
        assert!(!scorer.called.load(Ordering::SeqCst));
        // No object was stored, so nothing to delete.
        assert!(storage.deletes().is_empty());
        // Both staged files (input and transcoded) are gone.
        assert!(staged_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_uploads_never_collide() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SpyStorage::new());
        let pipeline = Arc::new(
            pipeline_with(
                dir.path(),
                Arc::new(CopyTranscoder),
                storage.clone(),
                Arc::new(RandomScorer::new()),
            )
            .await,
        );

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let pipeline = pipeline.clone();
            handles.push(tokio::spawn(async move {
                pipeline
                    .process_upload(Bytes::from(vec![i; 64]), "video/mp4")
                    .await
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            ids.insert(result.id);
        }

        assert_eq!(ids.len(), 8);
        assert_eq!(storage.puts().len(), 8);
        assert_eq!(storage.deletes().len(), 8);
        assert!(staged_files(dir.path()).is_empty());
    }
}
