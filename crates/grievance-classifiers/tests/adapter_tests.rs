//! Adapter tests against the bundled backends and mock backends

use async_trait::async_trait;
use grievance_classifiers::{
    ClassifierAdapter, ClassifierConfig, ClassifierLoader, KeywordLexicon, LabelScore,
    LazyClassifier, ZeroShotClassifier,
};
use grievance_core::{CategoryLabel, Error, Result, Taxonomy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Records the candidate lists it was offered
struct RecordingClassifier {
    seen: std::sync::Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl ZeroShotClassifier for RecordingClassifier {
    async fn rank(&self, _text: &str, candidate_labels: &[CategoryLabel]) -> Result<Vec<LabelScore>> {
        let labels: Vec<String> = candidate_labels.iter().map(|l| l.to_string()).collect();
        self.seen.lock().unwrap().push(labels.clone());
        Ok(labels
            .into_iter()
            .map(|l| LabelScore::new(l, 0.2))
            .collect())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// A loader for a backend that is never reachable
struct DownLoader {
    attempts: Arc<AtomicU32>,
}

#[async_trait]
impl ClassifierLoader for DownLoader {
    async fn load(&self) -> Result<Arc<dyn ZeroShotClassifier>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::unavailable("no route to host"))
    }

    fn describe(&self) -> String {
        "down".to_string()
    }
}

#[tokio::test]
async fn test_full_candidate_list_every_call() {
    let backend = Arc::new(RecordingClassifier {
        seen: std::sync::Mutex::new(Vec::new()),
    });
    let adapter = ClassifierAdapter::new(backend.clone());
    let taxonomy = Taxonomy::postal_default();

    for text in ["late parcel", "rude staff", "lost"] {
        adapter.classify(text, taxonomy.labels()).await.unwrap();
    }

    let seen = backend.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(seen[0].len(), taxonomy.len());
}

#[tokio::test]
async fn test_keyword_backend_from_config() {
    let config = ClassifierConfig::default();
    let backend = config
        .build_backend(KeywordLexicon::postal_default())
        .unwrap();
    let adapter = ClassifierAdapter::new(backend);
    let taxonomy = Taxonomy::postal_default();

    let result = adapter
        .classify("my parcel arrived broken", taxonomy.labels())
        .await
        .unwrap();
    assert_eq!(result.label.as_str(), "Damaged/Lost");
    assert!(result.confidence > 0.5);
    assert_eq!(adapter.backend_name(), "keyword");
}

#[tokio::test]
async fn test_unreachable_backend_surfaces_unavailable() {
    let attempts = Arc::new(AtomicU32::new(0));
    let adapter = ClassifierAdapter::new(Arc::new(LazyClassifier::new(DownLoader {
        attempts: attempts.clone(),
    })));
    let taxonomy = Taxonomy::postal_default();

    let err = adapter.classify("late", taxonomy.labels()).await.unwrap_err();
    assert!(matches!(err, Error::ClassifierUnavailable(_)));

    // Empty input is rejected before the loader is touched
    let err = adapter.classify(" ", taxonomy.labels()).await.unwrap_err();
    assert!(matches!(err, Error::EmptyInput));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
