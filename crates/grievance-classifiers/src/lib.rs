//! Grievance Classifiers
//!
//! The boundary to the external zero-shot text classifier and the adapter the
//! pipeline talks to.
//!
//! - [`ZeroShotClassifier`] is the consumed capability: rank candidate labels
//!   for a text.
//! - [`ClassifierAdapter`] validates input and reduces a ranking to its top
//!   entry.
//! - [`LazyClassifier`] loads an expensive backend once, on first use, and
//!   reuses it for the rest of the process.
//!
//! Two backends ship with the crate: an offline keyword lexicon and a hosted
//! Hugging Face zero-shot endpoint.

pub mod adapter;
pub mod classifier;
pub mod config;
pub mod huggingface;
pub mod keyword;
pub mod lazy;

pub use adapter::ClassifierAdapter;
pub use classifier::{ClassificationResult, LabelScore, ZeroShotClassifier};
pub use config::{BackendKind, ClassifierConfig};
pub use huggingface::{HuggingFaceLoader, HuggingFaceZeroShot};
pub use keyword::{KeywordClassifier, KeywordLexicon};
pub use lazy::{ClassifierLoader, LazyClassifier};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adapter::ClassifierAdapter;
    pub use crate::classifier::{ClassificationResult, LabelScore, ZeroShotClassifier};
    pub use crate::keyword::KeywordClassifier;
    pub use crate::lazy::LazyClassifier;
}
