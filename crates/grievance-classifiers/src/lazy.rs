//! Load-once classifier handle
//!
//! Model-backed classifiers are expensive to bring up. [`LazyClassifier`]
//! defers loading until the first ranking request and then holds the loaded
//! backend for as long as the handle lives. A failed load is not cached; the
//! next request tries again.

use crate::classifier::{LabelScore, ZeroShotClassifier};
use async_trait::async_trait;
use grievance_core::{CategoryLabel, Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Produces a ready-to-use classifier backend
#[async_trait]
pub trait ClassifierLoader: Send + Sync {
    /// Bring the backend up. Called at most once per successful load.
    async fn load(&self) -> Result<Arc<dyn ZeroShotClassifier>>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

pub struct LazyClassifier {
    name: String,
    loader: Box<dyn ClassifierLoader>,
    backend: OnceCell<Arc<dyn ZeroShotClassifier>>,
}

impl LazyClassifier {
    pub fn new(loader: impl ClassifierLoader + 'static) -> Self {
        Self {
            name: format!("lazy({})", loader.describe()),
            loader: Box::new(loader),
            backend: OnceCell::new(),
        }
    }

    /// Whether the backend has been loaded
    pub fn is_loaded(&self) -> bool {
        self.backend.initialized()
    }

    /// Get the backend, loading it on first access
    pub async fn get(&self) -> Result<&Arc<dyn ZeroShotClassifier>> {
        self.backend
            .get_or_try_init(|| async {
                let start = Instant::now();
                info!("Loading classifier {}", self.loader.describe());
                match self.loader.load().await {
                    Ok(backend) => {
                        info!(
                            "Classifier {} ready in {}ms",
                            backend.name(),
                            start.elapsed().as_millis()
                        );
                        Ok(backend)
                    }
                    Err(e) => {
                        warn!("Failed to load classifier {}: {}", self.loader.describe(), e);
                        Err(match e {
                            Error::ClassifierUnavailable(_) => e,
                            other => Error::unavailable(other.to_string()),
                        })
                    }
                }
            })
            .await
    }
}

#[async_trait]
impl ZeroShotClassifier for LazyClassifier {
    async fn rank(
        &self,
        text: &str,
        candidate_labels: &[CategoryLabel],
    ) -> Result<Vec<LabelScore>> {
        self.get().await?.rank(text, candidate_labels).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
