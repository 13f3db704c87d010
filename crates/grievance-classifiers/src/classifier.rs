//! Zero-shot classifier trait and common types

use async_trait::async_trait;
use grievance_core::{CategoryLabel, Result};
use serde::{Deserialize, Serialize};

/// Trait for external zero-shot classifiers
///
/// Implementations score every candidate label for the text and return them
/// ranked best first. Ties are whatever order the implementation produces.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Rank the candidate labels for the given text
    async fn rank(&self, text: &str, candidate_labels: &[CategoryLabel])
        -> Result<Vec<LabelScore>>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// One entry of a ranked classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Result of classifying one text
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// Top-ranked label
    pub label: CategoryLabel,

    /// Top-ranked score (0.0-1.0)
    pub confidence: f32,

    /// Full ranking as returned by the classifier
    pub ranking: Vec<LabelScore>,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<CategoryLabel>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            ranking: Vec::new(),
            latency_us: 0,
        }
    }

    /// Confidence as a percentage for display
    pub fn confidence_pct(&self) -> f32 {
        self.confidence * 100.0
    }
}
