//! Hosted zero-shot backend against a local mock inference server

use grievance_classifiers::{
    BackendKind, ClassifierAdapter, ClassifierConfig, HuggingFaceZeroShot, KeywordLexicon,
    ZeroShotClassifier,
};
use grievance_core::{Error, Taxonomy};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "valhalla/distilbart-mnli-12-3";

fn config_for(server: &MockServer) -> ClassifierConfig {
    ClassifierConfig {
        backend: BackendKind::HuggingFace,
        model: MODEL.to_string(),
        endpoint: format!("{}/models", server.uri()),
        api_token: Some("hf_test".to_string()),
        timeout_secs: 5,
        multi_label: false,
    }
}

async fn mount_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pipeline_response_ranks_and_sends_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .and(header("authorization", "Bearer hf_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sequence": "my parcel arrived broken",
            "labels": ["Damaged/Lost", "Delivery Delay", "Staff Behavior",
                       "General Inquiry", "Financial Services"],
            "scores": [0.91, 0.04, 0.02, 0.02, 0.01]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Built the way the CLI builds it: lazily loaded behind the adapter
    let backend = config_for(&server)
        .build_backend(KeywordLexicon::postal_default())
        .unwrap();
    let adapter = ClassifierAdapter::new(backend);
    let taxonomy = Taxonomy::postal_default();

    let result = adapter
        .classify("my parcel arrived broken", taxonomy.labels())
        .await
        .unwrap();
    assert_eq!(result.label.as_str(), "Damaged/Lost");
    assert!((result.confidence - 0.91).abs() < 1e-6);
    assert_eq!(result.ranking.len(), 5);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["inputs"], "my parcel arrived broken");
    assert_eq!(body["parameters"]["multi_label"], false);
    let sent: Vec<&str> = body["parameters"]["candidate_labels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect();
    let expected: Vec<&str> = taxonomy.labels().iter().map(|l| l.as_str()).collect();
    assert_eq!(sent, expected);
}

#[tokio::test]
async fn test_service_unavailable_maps_to_unavailable() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        503,
        r#"{"error":"Model is currently loading","estimated_time":20.0}"#,
    )
    .await;

    let backend = HuggingFaceZeroShot::new(&config_for(&server)).unwrap();
    let err = backend
        .rank("parcel is late", Taxonomy::postal_default().labels())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ClassifierUnavailable(_)), "{err}");
    assert!(!err.is_row_recoverable());
}

#[tokio::test]
async fn test_bad_request_maps_to_row_level_error() {
    let server = MockServer::start().await;
    mount_status(&server, 400, r#"{"error":"input too long"}"#).await;

    let backend = HuggingFaceZeroShot::new(&config_for(&server)).unwrap();
    let err = backend
        .rank("parcel is late", Taxonomy::postal_default().labels())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Classifier(_)), "{err}");
    assert!(err.is_row_recoverable());
}

#[tokio::test]
async fn test_unparseable_success_body_is_classifier_error() {
    let server = MockServer::start().await;
    mount_status(&server, 200, "not json").await;

    let backend = HuggingFaceZeroShot::new(&config_for(&server)).unwrap();
    let err = backend
        .rank("parcel is late", Taxonomy::postal_default().labels())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Classifier(_)));
}
