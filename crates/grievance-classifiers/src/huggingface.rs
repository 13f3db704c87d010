//! Hosted zero-shot classification via the Hugging Face Inference API
//!
//! Request body:
//! ```text
//! {"inputs": "...", "parameters": {"candidate_labels": ["..."], "multi_label": false}}
//! ```
//! The response is either the pipeline form
//! `{"sequence": "...", "labels": [...], "scores": [...]}` (ranked, best first)
//! or a list of `{"label": "...", "score": ...}` objects.

use crate::classifier::{LabelScore, ZeroShotClassifier};
use crate::config::ClassifierConfig;
use crate::lazy::ClassifierLoader;
use async_trait::async_trait;
use grievance_core::{CategoryLabel, Error, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct HuggingFaceZeroShot {
    name: String,
    client: reqwest::Client,
    url: String,
    api_token: Option<String>,
    multi_label: bool,
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: Vec<&'a str>,
    multi_label: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Pipeline {
        labels: Vec<String>,
        scores: Vec<f32>,
    },
    Scored(Vec<LabelScore>),
}

impl HuggingFaceZeroShot {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: format!("huggingface:{}", config.model),
            client,
            url: format!("{}/{}", config.endpoint.trim_end_matches('/'), config.model),
            api_token: config.api_token.clone(),
            multi_label: config.multi_label,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ZeroShotClassifier for HuggingFaceZeroShot {
    async fn rank(
        &self,
        text: &str,
        candidate_labels: &[CategoryLabel],
    ) -> Result<Vec<LabelScore>> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: candidate_labels.iter().map(CategoryLabel::as_str).collect(),
                multi_label: self.multi_label,
            },
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::unavailable(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::unavailable(format!("reading response from {}: {e}", self.url)))?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        debug!(url = %self.url, "zero-shot response received");
        parse_ranking(&text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Map a non-success response to an error.
///
/// Server-side trouble, rate limiting and auth problems mean no further call
/// will succeed either; anything else is about this particular input.
fn status_error(status: StatusCode, body: &str) -> Error {
    let detail = format!("{status}: {}", body.trim());
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || status == StatusCode::NOT_FOUND
    {
        Error::unavailable(detail)
    } else {
        Error::classifier(detail)
    }
}

/// Parse a zero-shot response body into a best-first ranking
fn parse_ranking(body: &str) -> Result<Vec<LabelScore>> {
    let response: ZeroShotResponse = serde_json::from_str(body)
        .map_err(|e| Error::classifier(format!("unexpected zero-shot response: {e}")))?;

    match response {
        ZeroShotResponse::Pipeline { labels, scores } => {
            if labels.len() != scores.len() {
                return Err(Error::classifier(format!(
                    "zero-shot response has {} labels but {} scores",
                    labels.len(),
                    scores.len()
                )));
            }
            Ok(labels
                .into_iter()
                .zip(scores)
                .map(|(label, score)| LabelScore::new(label, score))
                .collect())
        }
        ZeroShotResponse::Scored(mut scored) => {
            // Stable, so the service's order survives ties
            scored.sort_by(|a, b| b.score.total_cmp(&a.score));
            Ok(scored)
        }
    }
}

/// Loader used with [`crate::LazyClassifier`]
pub struct HuggingFaceLoader {
    config: ClassifierConfig,
}

impl HuggingFaceLoader {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClassifierLoader for HuggingFaceLoader {
    async fn load(&self) -> Result<Arc<dyn ZeroShotClassifier>> {
        let backend = HuggingFaceZeroShot::new(&self.config)?;
        debug!(url = backend.url(), "hugging face backend configured");
        Ok(Arc::new(backend))
    }

    fn describe(&self) -> String {
        format!("huggingface:{}", self.config.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipeline_response() {
        let body = r#"{"sequence":"my parcel arrived broken",
            "labels":["Damaged/Lost","Delivery Delay","General Inquiry"],
            "scores":[0.91,0.06,0.03]}"#;
        let ranking = parse_ranking(body).unwrap();
        assert_eq!(ranking[0], LabelScore::new("Damaged/Lost", 0.91));
        assert_eq!(ranking.len(), 3);
    }

    #[test]
    fn test_parse_scored_list_sorts_best_first() {
        let body = r#"[{"label":"Delivery Delay","score":0.2},{"label":"Damaged/Lost","score":0.8}]"#;
        let ranking = parse_ranking(body).unwrap();
        assert_eq!(ranking[0].label, "Damaged/Lost");
    }

    #[test]
    fn test_parse_rejects_mismatched_lengths() {
        let body = r#"{"labels":["a","b"],"scores":[0.5]}"#;
        assert!(matches!(parse_ranking(body), Err(Error::Classifier(_))));
        assert!(matches!(parse_ranking("not json"), Err(Error::Classifier(_))));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "model is loading"),
            Error::ClassifierUnavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            Error::ClassifierUnavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "input too long"),
            Error::Classifier(_)
        ));
    }

    #[test]
    fn test_url_joins_endpoint_and_model() {
        let config = ClassifierConfig {
            endpoint: "https://example.test/models/".to_string(),
            model: "valhalla/distilbart-mnli-12-3".to_string(),
            ..Default::default()
        };
        let backend = HuggingFaceZeroShot::new(&config).unwrap();
        assert_eq!(
            backend.url(),
            "https://example.test/models/valhalla/distilbart-mnli-12-3"
        );
        assert_eq!(backend.name(), "huggingface:valhalla/distilbart-mnli-12-3");
    }
}
