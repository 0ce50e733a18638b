//! Router-level tests against a fully in-process `Services`, with stub
//! `AccessOracle`/`LlmClient`/`DenseEncoder` so nothing touches the network.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mcb_domain::error::Result;
use mcb_domain::ports::{AccessOracle, DenseEncoder, LlmClassification, LlmClient, Permission};
use mcb_domain::value_objects::{CaseName, DenseVector};
use mcb_infrastructure::{Config, Services};
use mcb_infrastructure::services::ServiceDependencies;
use mcb_providers::{
    HttpFactExtractor, InMemoryDocumentRegistry, InlineFileSource, InProcessVectorStore, NaiveTokenizer,
    ParagraphChunker, PdfExtractFeatureProvider, PlainTextExtractor, RegexCitationEncoder, RuleBasedBoundaryDetector,
    RuleBasedSegmentClassifier, StopwordKeywordEncoder,
};
use serde_json::Value;
use tower::ServiceExt;

struct AllowAllOracle;

#[async_trait]
impl AccessOracle for AllowAllOracle {
    async fn can_access(&self, _case: &CaseName, _user_id: &str, _permission: Permission) -> Result<bool> {
        Ok(true)
    }
}

struct DenyAllOracle;

#[async_trait]
impl AccessOracle for DenyAllOracle {
    async fn can_access(&self, _case: &CaseName, _user_id: &str, _permission: Permission) -> Result<bool> {
        Ok(false)
    }
}

/// Deterministic stub embedder: hashes the text into a fixed-size vector so
/// tests never reach a network embedding backend.
struct StubDenseEncoder;

#[async_trait]
impl DenseEncoder for StubDenseEncoder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<DenseVector>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0f32; 4];
                for (i, byte) in t.bytes().enumerate() {
                    v[i % 4] += f32::from(byte);
                }
                let mut dense = DenseVector(v);
                dense.normalize();
                dense
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        4
    }
}

struct StubLlmClient;

#[async_trait]
impl LlmClient for StubLlmClient {
    async fn classify(&self, _text: &str, _allowed_labels: &[String], _hints: &[String]) -> Result<LlmClassification> {
        Ok(LlmClassification {
            label: "Correspondence".to_owned(),
            confidence: 0.6,
        })
    }

    async fn extract_facts(&self, _text: &str, _schema_hint: &str) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }
}

fn build_services(oracle: Arc<dyn AccessOracle>) -> Arc<Services> {
    let config = Config::default();
    let dense_encoder: Arc<dyn DenseEncoder> = Arc::new(StubDenseEncoder);
    let llm: Arc<dyn LlmClient> = Arc::new(StubLlmClient);
    let vector_store = Arc::new(InProcessVectorStore::new(Arc::clone(&dense_encoder)));
    let keyword_encoder = Arc::new(StopwordKeywordEncoder);
    let citation_encoder = Arc::new(RegexCitationEncoder);

    let deps = ServiceDependencies {
        access_oracle: oracle,
        file_source: Arc::new(InlineFileSource),
        pdf_features: Arc::new(PdfExtractFeatureProvider),
        boundary_detector: Arc::new(RuleBasedBoundaryDetector::new(
            config.soft_boundary_threshold,
            config.ocr_threshold_relaxation,
        )),
        classifier: Arc::new(RuleBasedSegmentClassifier::new(Arc::clone(&llm))),
        text_extractor: Arc::new(PlainTextExtractor),
        chunker: Arc::new(ParagraphChunker::new(Arc::new(NaiveTokenizer))),
        dense_encoder: Arc::clone(&dense_encoder),
        keyword_encoder: keyword_encoder.clone(),
        citation_encoder: citation_encoder.clone(),
        vector_store: vector_store.clone(),
        document_registry: Arc::new(InMemoryDocumentRegistry::new()),
        fact_extractor: Arc::new(HttpFactExtractor::new(llm, Arc::clone(&dense_encoder), vector_store.clone())),
        progress_bus: Arc::new(mcb_infrastructure::InProcessProgressBus::new(config.progress_bus_buffer)),
        lifecycle_managed: Vec::new(),
    };

    Arc::new(Services::new(config, deps))
}

fn inline_files_body(case_name: &str) -> Body {
    let files = serde_json::json!([
        { "name": "letter.txt", "contentBase64": base64_encode(b"Dear counsel, regarding the matter of our case.") }
    ]);
    Body::from(
        serde_json::json!({
            "caseName": case_name,
            "files": files,
            "enableFactExtraction": false,
        })
        .to_string(),
    )
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD.encode(bytes)
}

#[tokio::test]
async fn process_then_status_round_trips() {
    let services = build_services(Arc::new(AllowAllOracle));
    let app = mcb_server::router(services);

    let request = Request::builder()
        .method("POST")
        .uri("/discovery/process")
        .header("content-type", "application/json")
        .header("X-Case-Id", "smithv-acme")
        .body(inline_files_body("smithv-acme"))
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = response.into_body().collect().await.expect("body").to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json");
    let processing_id = parsed["processingId"].as_str().expect("processingId string");

    let status_request = Request::builder()
        .method("GET")
        .uri(format!("/discovery/status/{processing_id}"))
        .body(Body::empty())
        .expect("request");

    let status_response = app.oneshot(status_request).await.expect("response");
    assert_eq!(status_response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mismatched_case_header_is_rejected() {
    let services = build_services(Arc::new(AllowAllOracle));
    let app = mcb_server::router(services);

    let request = Request::builder()
        .method("POST")
        .uri("/discovery/process")
        .header("content-type", "application/json")
        .header("X-Case-Id", "other-case")
        .body(inline_files_body("smithv-acme"))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn access_denied_oracle_yields_403() {
    let services = build_services(Arc::new(DenyAllOracle));
    let app = mcb_server::router(services);

    let request = Request::builder()
        .method("POST")
        .uri("/discovery/process")
        .header("content-type", "application/json")
        .header("X-Case-Id", "smithv-acme")
        .body(inline_files_body("smithv-acme"))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_processing_id_yields_404() {
    let services = build_services(Arc::new(AllowAllOracle));
    let app = mcb_server::router(services);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/discovery/status/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
