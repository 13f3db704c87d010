//! Category taxonomy
//!
//! The fixed, ordered candidate label list offered to the classifier, and the
//! static mapping from each label to its priority and sentiment tier. Lookups
//! are table reads; a label outside the list is an [`Error::UnknownCategory`].

use crate::error::{Error, Result};
use crate::types::{CategoryLabel, PriorityLevel, SentimentLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Built-in postal grievance categories, in candidate order
const POSTAL_CATEGORIES: [(&str, PriorityLevel, SentimentLevel); 5] = [
    ("Delivery Delay", PriorityLevel::Medium, SentimentLevel::Negative),
    ("Staff Behavior", PriorityLevel::High, SentimentLevel::Negative),
    ("Damaged/Lost", PriorityLevel::High, SentimentLevel::Negative),
    ("General Inquiry", PriorityLevel::Low, SentimentLevel::Neutral),
    ("Financial Services", PriorityLevel::Low, SentimentLevel::Positive),
];

/// One taxonomy entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub label: CategoryLabel,
    pub priority: PriorityLevel,
    pub sentiment: SentimentLevel,
}

impl CategorySpec {
    pub fn new(
        label: impl Into<CategoryLabel>,
        priority: PriorityLevel,
        sentiment: SentimentLevel,
    ) -> Self {
        Self {
            label: label.into(),
            priority,
            sentiment,
        }
    }
}

/// Ordered category list with priority/sentiment lookups
#[derive(Debug, Clone)]
pub struct Taxonomy {
    labels: Vec<CategoryLabel>,
    tiers: HashMap<CategoryLabel, (PriorityLevel, SentimentLevel)>,
}

impl Taxonomy {
    /// Build a taxonomy, rejecting an empty list or duplicate labels
    pub fn new(specs: impl IntoIterator<Item = CategorySpec>) -> Result<Self> {
        let mut labels = Vec::new();
        let mut tiers = HashMap::new();

        for spec in specs {
            if spec.label.as_str().trim().is_empty() {
                return Err(Error::config("category label must not be blank"));
            }
            if tiers
                .insert(spec.label.clone(), (spec.priority, spec.sentiment))
                .is_some()
            {
                return Err(Error::config(format!(
                    "duplicate category label: {}",
                    spec.label
                )));
            }
            labels.push(spec.label);
        }

        if labels.is_empty() {
            return Err(Error::config("taxonomy has no categories"));
        }

        Ok(Self { labels, tiers })
    }

    /// The postal service categories
    pub fn postal_default() -> Self {
        let mut labels = Vec::with_capacity(POSTAL_CATEGORIES.len());
        let mut tiers = HashMap::with_capacity(POSTAL_CATEGORIES.len());
        for (label, priority, sentiment) in POSTAL_CATEGORIES {
            let label = CategoryLabel::new(label);
            tiers.insert(label.clone(), (priority, sentiment));
            labels.push(label);
        }
        Self { labels, tiers }
    }

    /// Candidate labels in their stable order
    pub fn labels(&self) -> &[CategoryLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.tiers.contains_key(label)
    }

    /// Map a raw label onto the taxonomy's own label value
    pub fn resolve(&self, label: &str) -> Result<&CategoryLabel> {
        self.labels
            .iter()
            .find(|l| l.as_str() == label)
            .ok_or_else(|| Error::UnknownCategory(label.to_string()))
    }

    pub fn priority_for(&self, label: &str) -> Result<PriorityLevel> {
        self.tiers
            .get(label)
            .map(|(priority, _)| *priority)
            .ok_or_else(|| Error::UnknownCategory(label.to_string()))
    }

    pub fn sentiment_for(&self, label: &str) -> Result<SentimentLevel> {
        self.tiers
            .get(label)
            .map(|(_, sentiment)| *sentiment)
            .ok_or_else(|| Error::UnknownCategory(label.to_string()))
    }

    /// Entries in candidate order
    pub fn specs(&self) -> impl Iterator<Item = CategorySpec> + '_ {
        self.labels.iter().map(|label| {
            let (priority, sentiment) = self.tiers[label];
            CategorySpec::new(label.clone(), priority, sentiment)
        })
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::postal_default()
    }
}
