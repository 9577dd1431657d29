//! Domain models shared across the pipeline crates.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Inclusive lower bound of every performance score.
pub const SCORE_MIN: u8 = 70;
/// Exclusive upper bound of every performance score.
pub const SCORE_MAX: u8 = 100;

/// Performance scores for one analyzed video.
///
/// This is the only entity that outlives an ingestion request. The three
/// scores are opaque metrics in `[SCORE_MIN, SCORE_MAX)`; their precise
/// semantics are defined by whichever scoring backend produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub accuracy: u8,
    pub speed: u8,
    pub technique: u8,
}

impl AnalysisResult {
    /// Whether all three scores lie in the expected range.
    pub fn scores_in_range(&self) -> bool {
        [self.accuracy, self.speed, self.technique]
            .iter()
            .all(|&s| (SCORE_MIN..SCORE_MAX).contains(&s))
    }
}

/// Reference to a stored video handed to the scoring backend.
///
/// The current scorer ignores it, but a real analysis model needs a way to
/// fetch the video, so the reference travels through the contract.
#[derive(Debug, Clone)]
pub struct VideoRef {
    pub key: String,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_in_range() {
        let result = AnalysisResult {
            id: Uuid::new_v4(),
            accuracy: 70,
            speed: 85,
            technique: 99,
        };
        assert!(result.scores_in_range());
    }

    #[test]
    fn test_scores_out_of_range() {
        let result = AnalysisResult {
            id: Uuid::new_v4(),
            accuracy: 100,
            speed: 85,
            technique: 99,
        };
        assert!(!result.scores_in_range());

        let result = AnalysisResult {
            id: Uuid::new_v4(),
            accuracy: 90,
            speed: 69,
            technique: 99,
        };
        assert!(!result.scores_in_range());
    }

    #[test]
    fn test_analysis_result_serializes_flat() {
        let result = AnalysisResult {
            id: Uuid::new_v4(),
            accuracy: 72,
            speed: 88,
            technique: 91,
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert!(json.get("id").and_then(|v| v.as_str()).is_some());
        assert_eq!(json.get("accuracy").and_then(|v| v.as_u64()), Some(72));
        assert_eq!(json.get("speed").and_then(|v| v.as_u64()), Some(88));
        assert_eq!(json.get("technique").and_then(|v| v.as_u64()), Some(91));
    }
}
