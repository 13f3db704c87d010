//! Keyword lexicon classifier
//!
//! An offline stand-in for a hosted zero-shot model. Each category carries a
//! keyword list; a text scores one hit per (leftmost-longest,
//! case-insensitive) keyword match that stands as whole words. Hits are smoothed and normalised into a
//! distribution over the candidate labels. When nothing matches, the fallback
//! label takes the lead.

use crate::classifier::{LabelScore, ZeroShotClassifier};
use aho_corasick::{AhoCorasick, MatchKind};
use grievance_core::{CategoryLabel, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight every candidate gets before hits are counted
const SMOOTHING: f32 = 0.1;

/// Extra weight for the fallback label when the text matches no keyword
const FALLBACK_BOOST: f32 = 1.0;

/// Keywords per category plus the label to prefer when nothing matches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordLexicon {
    pub entries: Vec<(CategoryLabel, Vec<String>)>,

    #[serde(default)]
    pub fallback: Option<CategoryLabel>,
}

impl KeywordLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add keywords for a category
    pub fn with_keywords<I, S>(mut self, label: impl Into<CategoryLabel>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((label.into(), keywords.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_fallback(mut self, label: impl Into<CategoryLabel>) -> Self {
        self.fallback = Some(label.into());
        self
    }

    /// Keywords for the postal grievance categories
    pub fn postal_default() -> Self {
        Self::new()
            .with_keywords(
                "Delivery Delay",
                [
                    "delay", "delays", "delayed", "late", "not delivered", "not received", "still waiting",
                    "not arrived", "stuck", "overdue", "tracking", "where is my",
                ],
            )
            .with_keywords(
                "Staff Behavior",
                [
                    "rude", "staff", "postman", "behaviour", "behavior", "misbehave",
                    "misbehaved", "abusive", "impolite", "shouted", "clerk", "bribe",
                ],
            )
            .with_keywords(
                "Damaged/Lost",
                [
                    "damaged", "damage", "broken", "lost", "missing", "torn", "tampered",
                    "crushed", "leaked", "stolen",
                ],
            )
            .with_keywords(
                "General Inquiry",
                [
                    "inquiry", "enquiry", "information", "how do i", "how can i", "timings",
                    "pin code", "pincode", "question", "locate",
                ],
            )
            .with_keywords(
                "Financial Services",
                [
                    "savings", "interest", "account", "deposit", "insurance", "money order",
                    "scheme", "investment", "pension", "recurring deposit", "postal life insurance",
                ],
            )
            .with_fallback("General Inquiry")
    }
}

pub struct KeywordClassifier {
    name: String,
    matcher: AhoCorasick,
    /// Category of each matcher pattern, by pattern index
    pattern_labels: Vec<CategoryLabel>,
    fallback: Option<CategoryLabel>,
}

impl KeywordClassifier {
    pub fn new(lexicon: KeywordLexicon) -> Result<Self> {
        Self::with_name("keyword", lexicon)
    }

    pub fn postal_default() -> Result<Self> {
        Self::new(KeywordLexicon::postal_default())
    }

    pub fn with_name(name: impl Into<String>, lexicon: KeywordLexicon) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut pattern_labels = Vec::new();
        for (label, keywords) in &lexicon.entries {
            for keyword in keywords {
                let keyword = keyword.trim();
                if keyword.is_empty() {
                    continue;
                }
                patterns.push(keyword.to_string());
                pattern_labels.push(label.clone());
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| Error::config(format!("Failed to build keyword matcher: {e}")))?;

        Ok(Self {
            name: name.into(),
            matcher,
            pattern_labels,
            fallback: lexicon.fallback,
        })
    }

    /// Keyword hits per label for `text`
    fn hits(&self, text: &str) -> HashMap<&CategoryLabel, u32> {
        let mut hits = HashMap::new();
        for mat in self.matcher.find_iter(text) {
            if !is_word_bounded(text, mat.start(), mat.end()) {
                continue;
            }
            *hits
                .entry(&self.pattern_labels[mat.pattern().as_usize()])
                .or_insert(0) += 1;
        }
        hits
    }
}

/// Whether `text[start..end]` has no letter or digit directly on either side
fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

#[async_trait::async_trait]
impl ZeroShotClassifier for KeywordClassifier {
    async fn rank(
        &self,
        text: &str,
        candidate_labels: &[CategoryLabel],
    ) -> Result<Vec<LabelScore>> {
        let hits = self.hits(text);
        let matched_any = candidate_labels.iter().any(|l| hits.contains_key(l));

        let weights: Vec<f32> = candidate_labels
            .iter()
            .map(|label| {
                let mut weight = SMOOTHING + hits.get(label).copied().unwrap_or(0) as f32;
                if !matched_any && self.fallback.as_ref() == Some(label) {
                    weight += FALLBACK_BOOST;
                }
                weight
            })
            .collect();
        let total: f32 = weights.iter().sum();

        let mut ranking: Vec<LabelScore> = candidate_labels
            .iter()
            .zip(weights)
            .map(|(label, weight)| LabelScore::new(label.as_str(), weight / total))
            .collect();

        // Stable sort: equal scores stay in candidate order
        ranking.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(ranking)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
