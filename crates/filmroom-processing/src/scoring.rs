//! Scoring backend seam.
//!
//! `Scorer` is the contract a real analysis model will implement; the
//! orchestrator only ever sees this trait. The shipped implementation is a
//! placeholder that fabricates scores, but the signature is async, takes the
//! stored video reference, and can fail, so a remote inference service slots
//! in without touching the call site.

use async_trait::async_trait;
use filmroom_core::{AnalysisResult, VideoRef, SCORE_MAX, SCORE_MIN};
use rand::Rng;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Scoring backend error: {0}")]
    Backend(String),
}

/// Produces the performance metrics for one stored video.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, video: &VideoRef, id: Uuid) -> Result<AnalysisResult, ScoringError>;
}

/// Placeholder scorer: uniform random scores in `[SCORE_MIN, SCORE_MAX)`.
#[derive(Clone, Default)]
pub struct RandomScorer;

impl RandomScorer {
    pub fn new() -> Self {
        RandomScorer
    }
}

#[async_trait]
impl Scorer for RandomScorer {
    async fn score(&self, _video: &VideoRef, id: Uuid) -> Result<AnalysisResult, ScoringError> {
        let mut rng = rand::rng();
        Ok(AnalysisResult {
            id,
            accuracy: rng.random_range(SCORE_MIN..SCORE_MAX),
            speed: rng.random_range(SCORE_MIN..SCORE_MAX),
            technique: rng.random_range(SCORE_MIN..SCORE_MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_ref() -> VideoRef {
        VideoRef {
            key: "videos/test.mp4".to_string(),
            url: None,
        }
    }

    #[tokio::test]
    async fn test_random_scores_stay_in_range() {
        let scorer = RandomScorer::new();

        for _ in 0..200 {
            let result = scorer.score(&video_ref(), Uuid::new_v4()).await.unwrap();
            assert!(result.scores_in_range(), "out of range: {:?}", result);
        }
    }

    #[tokio::test]
    async fn test_result_carries_request_id() {
        let scorer = RandomScorer::new();
        let id = Uuid::new_v4();
        let result = scorer.score(&video_ref(), id).await.unwrap();
        assert_eq!(result.id, id);
    }
}
