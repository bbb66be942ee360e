// HTTP surface exercised in-process through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use clausewise_core::{
    config::Config,
    nlu::NluClient,
    types::{NluResult, NluSource},
};
use clausewise_nlu::{mock_result, MockNluClient};
use clausewise_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const LEASE_CLAUSE: &str = "The tenant shall pay rent within 30 days of the invoice date, \
                            or the agreement is subject to immediate termination.";
const BOUNDARY: &str = "clausewise-test-boundary";

fn test_app(dir: &tempfile::TempDir, nlu: Arc<dyn NluClient>) -> Router {
    app_with_limit(dir, nlu, 1024)
}

fn app_with_limit(dir: &tempfile::TempDir, nlu: Arc<dyn NluClient>, max_bytes: usize) -> Router {
    let upload_dir = dir.path().join("uploads").to_string_lossy().into_owned();
    let config = Config::from_lookup(move |key| match key {
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        "MAX_UPLOAD_BYTES" => Some(max_bytes.to_string()),
        _ => None,
    });
    router(Arc::new(AppState::new(config, nlu).unwrap()))
}

fn mock_app(dir: &tempfile::TempDir) -> Router {
    test_app(dir, Arc::new(MockNluClient::new()))
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

struct FixedRealClient;

#[async_trait]
impl NluClient for FixedRealClient {
    async fn analyze(&self, _text: &str) -> NluResult {
        let mut result = mock_result(None);
        result.source = NluSource::Real;
        result.summary = "fixed".into();
        result
    }

    fn source(&self) -> NluSource {
        NluSource::Real
    }
}

// =============================================================================
// Health / index
// =============================================================================

#[tokio::test]
async fn test_health_reports_nlu_source() {
    let dir = tempfile::tempdir().unwrap();
    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let (status, body) = send(mock_app(&dir), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["nlu_source"], "mock");
    assert!(body["uptime_s"].is_u64());
}

#[tokio::test]
async fn test_index_is_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = mock_app(&dir).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Analyze / compare
// =============================================================================

#[tokio::test]
async fn test_analyze_returns_full_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let req = json_request("/api/analyze", json!({ "text": LEASE_CLAUSE }));
    let (status, body) = send(mock_app(&dir), req).await;

    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = body["clauses"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["clause_type"].as_str())
        .collect();
    assert!(types.contains(&"payment"));
    assert!(types.contains(&"termination"));
    assert_eq!(body["risk"]["level"], "medium");
    let timeline = body["timeline"].as_array().unwrap();
    assert!(timeline
        .iter()
        .any(|e| e["raw_text"] == "30 days" && e["kind"] == "duration"));
    assert!(body["tone"]["formality"].is_f64());
    assert_eq!(
        body["statistics"]["total_clauses"].as_u64(),
        Some(body["clauses"].as_array().unwrap().len() as u64)
    );
}

#[tokio::test]
async fn test_analyze_rejects_bad_bodies() {
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(mock_app(&dir), json_request("/api/analyze", json!({ "txt": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(mock_app(&dir), json_request("/api/analyze", json!({ "text": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(mock_app(&dir), malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rejects_oversized_text() {
    let dir = tempfile::tempdir().unwrap();
    let req = json_request("/api/analyze", json!({ "text": "a".repeat(2048) }));
    let (status, body) = send(mock_app(&dir), req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_compare_reports_unique_types() {
    let dir = tempfile::tempdir().unwrap();
    let req = json_request(
        "/api/compare",
        json!({
            "doc1_text": LEASE_CLAUSE,
            "doc2_text": "Each party shall keep all confidential information secret for five years.",
        }),
    );
    let (status, body) = send(mock_app(&dir), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doc2_unique_types"], json!(["confidentiality"]));
    assert!(body["text_similarity"].as_f64().unwrap() < 0.5);
}

#[tokio::test]
async fn test_compare_accepts_two_documents_each_within_limit() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_limit(&dir, Arc::new(MockNluClient::new()), 100_000);
    // together the two texts exceed a single document's body allowance
    let req = json_request(
        "/api/compare",
        json!({ "doc1_text": "a".repeat(90_000), "doc2_text": "b".repeat(90_000) }),
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text_similarity"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_compare_still_enforces_per_document_limit() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_limit(&dir, Arc::new(MockNluClient::new()), 100_000);
    let req = json_request(
        "/api/compare",
        json!({ "doc1_text": "a".repeat(100_001), "doc2_text": LEASE_CLAUSE }),
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_compare_requires_both_texts() {
    let dir = tempfile::tempdir().unwrap();
    let req = json_request("/api/compare", json!({ "doc1_text": LEASE_CLAUSE, "doc2_text": "" }));
    let (status, body) = send(mock_app(&dir), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No doc2_text provided");
}

// =============================================================================
// NLU
// =============================================================================

#[tokio::test]
async fn test_watson_nlu_without_credentials_is_mock() {
    let dir = tempfile::tempdir().unwrap();
    let req = json_request("/api/watson-nlu", json!({ "text": LEASE_CLAUSE }));
    let (status, body) = send(mock_app(&dir), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "mock");
    assert!(body["fallback_reason"].is_string());
    assert_eq!(body["entities"].as_array().unwrap().len(), 3);
    assert_eq!(body["entities"][0]["type"], "Legal Document");
}

#[tokio::test]
async fn test_watson_nlu_uses_injected_client() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, Arc::new(FixedRealClient));
    let req = json_request("/api/watson-nlu", json!({ "text": LEASE_CLAUSE }));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "real");
    assert_eq!(body["summary"], "fixed");
    assert!(body.get("fallback_reason").is_none());
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_txt() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(mock_app(&dir), upload_request("lease.txt", LEASE_CLAUSE.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "lease.txt");
    assert_eq!(body["format"], "txt");
    assert_eq!(body["text"], LEASE_CLAUSE);
    assert_eq!(body["text_preview"], LEASE_CLAUSE);
    assert_eq!(body["char_count"].as_u64(), Some(LEASE_CLAUSE.chars().count() as u64));
    assert_eq!(body["file_id"].as_str().map(str::len), Some(64));
}

#[tokio::test]
async fn test_upload_unsupported_format_is_415() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(mock_app(&dir), upload_request("contract.rtf", b"{\\rtf1}")).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].as_str().unwrap().contains("rtf"));
}

#[tokio::test]
async fn test_upload_too_large_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let big = vec![b'a'; 2000];
    let (status, _) = send(mock_app(&dir), upload_request("big.txt", &big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let leftovers = std::fs::read_dir(dir.path().join("uploads"))
        .map(|d| d.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_upload_unreadable_file_is_422() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _) = send(mock_app(&dir), upload_request("scan.pdf", b"not a pdf")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_requires_multipart_file() {
    let dir = tempfile::tempdir().unwrap();

    let (status, _) = send(mock_app(&dir), json_request("/api/upload", json!({ "file": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(mock_app(&dir), upload_request("", b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file selected");
}
