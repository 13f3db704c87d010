//! Classifier backend configuration

use crate::classifier::ZeroShotClassifier;
use crate::huggingface::HuggingFaceLoader;
use crate::keyword::{KeywordClassifier, KeywordLexicon};
use crate::lazy::LazyClassifier;
use grievance_core::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which backend answers ranking requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Offline keyword lexicon
    #[default]
    Keyword,
    /// Hosted Hugging Face zero-shot endpoint
    HuggingFace,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            other => Err(format!("unknown classifier backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Hosted model id
    #[serde(default = "default_model")]
    pub model: String,

    /// Inference endpoint base URL; the model id is appended
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token, usually supplied through the environment
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,

    /// HTTP client timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Score labels independently instead of as one distribution
    #[serde(default)]
    pub multi_label: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            model: default_model(),
            endpoint: default_endpoint(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
            multi_label: false,
        }
    }
}

impl ClassifierConfig {
    /// Build the configured backend.
    ///
    /// The hosted backend is wrapped in a [`LazyClassifier`] so it is brought
    /// up on first use and then reused.
    pub fn build_backend(&self, lexicon: KeywordLexicon) -> Result<Arc<dyn ZeroShotClassifier>> {
        match self.backend {
            BackendKind::Keyword => {
                info!("Using keyword classifier with {} categories", lexicon.entries.len());
                Ok(Arc::new(KeywordClassifier::new(lexicon)?))
            }
            BackendKind::HuggingFace => {
                info!("Using Hugging Face zero-shot model {}", self.model);
                Ok(Arc::new(LazyClassifier::new(HuggingFaceLoader::new(
                    self.clone(),
                ))))
            }
        }
    }
}

fn default_model() -> String {
    "valhalla/distilbart-mnli-12-3".to_string()
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}
