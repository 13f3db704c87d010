//! Pipeline configuration
//!
//! Everything the pipeline needs, loadable from one YAML file: the classifier
//! backend, the categories (tiers, keywords and reply templates), column
//! synonyms and batch options. Missing sections fall back to the postal
//! defaults.

use crate::analyzer::GrievanceAnalyzer;
use crate::batch::{BatchOptions, BatchProcessor};
use crate::table::ColumnAliases;
use crate::templates::ReplyTemplates;
use grievance_classifiers::{ClassifierConfig, KeywordLexicon};
use grievance_core::{
    CategoryLabel, CategorySpec, Error, PriorityLevel, Result, SentimentLevel, Taxonomy,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Categories in candidate order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,

    /// Category the keyword backend prefers when nothing matches
    #[serde(default = "default_fallback_label")]
    pub fallback_label: Option<CategoryLabel>,

    #[serde(default)]
    pub batch: BatchOptions,

    #[serde(default)]
    pub columns: ColumnAliases,
}

/// One category entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub label: CategoryLabel,

    pub priority: PriorityLevel,

    pub sentiment: SentimentLevel,

    /// Keywords for the keyword backend
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Reply template; the built-in one for this label when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            categories: default_categories(),
            fallback_label: default_fallback_label(),
            batch: BatchOptions::default(),
            columns: ColumnAliases::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("invalid YAML: {e}")))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    pub fn taxonomy(&self) -> Result<Taxonomy> {
        Taxonomy::new(
            self.categories
                .iter()
                .map(|c| CategorySpec::new(c.label.clone(), c.priority, c.sentiment)),
        )
    }

    /// Configured templates, with built-ins filling labels that have none
    pub fn templates(&self) -> ReplyTemplates {
        let builtin = ReplyTemplates::postal_default();
        self.categories
            .iter()
            .fold(ReplyTemplates::new(), |templates, category| {
                let label = category.label.as_str();
                match category.template.as_deref().or_else(|| builtin.get(label)) {
                    Some(template) => templates.with_template(label, template),
                    None => templates,
                }
            })
    }

    pub fn lexicon(&self) -> KeywordLexicon {
        KeywordLexicon {
            entries: self
                .categories
                .iter()
                .map(|c| (c.label.clone(), c.keywords.clone()))
                .collect(),
            fallback: self.fallback_label.clone(),
        }
    }

    /// Check taxonomy, templates and fallback label against each other
    pub fn validate(&self) -> Result<Taxonomy> {
        let taxonomy = self.taxonomy()?;
        self.templates().validate_against(&taxonomy)?;
        if let Some(fallback) = &self.fallback_label {
            if !taxonomy.contains(fallback.as_str()) {
                return Err(Error::UnknownCategory(fallback.to_string()));
            }
        }
        Ok(taxonomy)
    }

    pub fn build_analyzer(&self) -> Result<GrievanceAnalyzer> {
        let taxonomy = self.validate()?;
        let backend = self.classifier.build_backend(self.lexicon())?;
        GrievanceAnalyzer::new(taxonomy, self.templates(), backend)
    }

    pub fn build_processor(&self) -> Result<BatchProcessor> {
        Ok(BatchProcessor::new(Arc::new(self.build_analyzer()?))
            .with_columns(self.columns.clone())
            .with_options(self.batch.clone()))
    }
}

fn default_categories() -> Vec<CategoryConfig> {
    let lexicon = KeywordLexicon::postal_default();
    Taxonomy::postal_default()
        .specs()
        .map(|spec| {
            let keywords = lexicon
                .entries
                .iter()
                .find(|(label, _)| *label == spec.label)
                .map(|(_, keywords)| keywords.clone())
                .unwrap_or_default();
            CategoryConfig {
                label: spec.label,
                priority: spec.priority,
                sentiment: spec.sentiment,
                keywords,
                template: None,
            }
        })
        .collect()
}

fn default_fallback_label() -> Option<CategoryLabel> {
    Some(CategoryLabel::new("General Inquiry"))
}
