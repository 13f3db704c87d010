//! Single-item analyzer
//!
//! validate → classify → look up tiers → render reply → open ticket. The live
//! path and every batch row go through [`GrievanceAnalyzer::analyze`].

use crate::templates::{ReplyParams, ReplyTemplates};
use grievance_classifiers::{ClassificationResult, ClassifierAdapter, ZeroShotClassifier};
use grievance_core::{Error, Result, Taxonomy, Ticket, Triage};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GrievanceAnalyzer {
    taxonomy: Arc<Taxonomy>,
    templates: Arc<ReplyTemplates>,
    classifier: ClassifierAdapter,
}

impl GrievanceAnalyzer {
    /// Create an analyzer; fails if the templates do not cover the taxonomy
    pub fn new(
        taxonomy: Taxonomy,
        templates: ReplyTemplates,
        backend: Arc<dyn ZeroShotClassifier>,
    ) -> Result<Self> {
        templates.validate_against(&taxonomy)?;

        Ok(Self {
            taxonomy: Arc::new(taxonomy),
            templates: Arc::new(templates),
            classifier: ClassifierAdapter::new(backend),
        })
    }

    /// Postal taxonomy and templates over the given backend
    pub fn postal_default(backend: Arc<dyn ZeroShotClassifier>) -> Result<Self> {
        Self::new(
            Taxonomy::postal_default(),
            ReplyTemplates::postal_default(),
            backend,
        )
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn templates(&self) -> &ReplyTemplates {
        &self.templates
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.backend_name()
    }

    /// Classify against the full taxonomy without building a ticket
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.classifier.classify(text, self.taxonomy.labels()).await
    }

    /// Analyze one complaint into an open ticket
    pub async fn analyze(&self, text: &str, ticket_id: &str, customer_name: &str) -> Result<Ticket> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let classification = self.classify(text).await?;
        let category = self.taxonomy.resolve(classification.label.as_str())?.clone();
        let priority = self.taxonomy.priority_for(category.as_str())?;
        let sentiment = self.taxonomy.sentiment_for(category.as_str())?;
        let draft_reply = self
            .templates
            .render(category.as_str(), ReplyParams::new(ticket_id, customer_name))?;

        debug!(
            ticket_id,
            category = %category,
            confidence = classification.confidence,
            latency_us = classification.latency_us,
            "analyzed complaint"
        );

        Ok(Ticket::classified(
            ticket_id,
            customer_name,
            text,
            Triage {
                category,
                confidence: classification.confidence,
                priority,
                sentiment,
            },
            draft_reply,
        ))
    }
}
