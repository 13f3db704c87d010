//! Classifier adapter
//!
//! Thin layer between the pipeline and a [`ZeroShotClassifier`]: rejects empty
//! text before any backend call, and reduces the ranked output to its first
//! entry.

use crate::classifier::{ClassificationResult, ZeroShotClassifier};
use grievance_core::{CategoryLabel, Error, Result};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ClassifierAdapter {
    backend: Arc<dyn ZeroShotClassifier>,
}

impl ClassifierAdapter {
    pub fn new(backend: Arc<dyn ZeroShotClassifier>) -> Self {
        Self { backend }
    }

    /// Name of the wrapped backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Classify `text` against the full candidate list.
    ///
    /// The top entry of the backend's ranking wins, so ties resolve in the
    /// backend's own order.
    pub async fn classify(
        &self,
        text: &str,
        candidate_labels: &[CategoryLabel],
    ) -> Result<ClassificationResult> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        if candidate_labels.is_empty() {
            return Err(Error::config("no candidate labels to classify against"));
        }

        let start = Instant::now();
        let ranking = self.backend.rank(text, candidate_labels).await?;
        let latency_us = start.elapsed().as_micros() as u64;
        metrics::histogram!("grievance_classify_latency_us").record(latency_us as f64);

        let top = ranking.first().ok_or_else(|| {
            Error::classifier(format!("{} returned an empty ranking", self.backend.name()))
        })?;
        if !top.score.is_finite() {
            return Err(Error::classifier(format!(
                "{} returned a non-finite score for '{}'",
                self.backend.name(),
                top.label
            )));
        }

        tracing::trace!(
            backend = self.backend.name(),
            label = %top.label,
            score = top.score,
            latency_us,
            "classified"
        );

        Ok(ClassificationResult {
            label: CategoryLabel::new(top.label.clone()),
            confidence: top.score.clamp(0.0, 1.0),
            ranking,
            latency_us,
        })
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("backend", &self.backend.name())
            .finish()
    }
}
