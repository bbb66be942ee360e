// Watson client against a local stub server: success, HTTP error, timeout,
// unreachable host and missing credentials. Every failure must produce the
// mock analysis with a reason, never an error.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use clausewise_core::nlu::{NluClient, NluError};
use clausewise_core::types::NluSource;
use clausewise_nlu::{mock_result, WatsonNluClient};
use serde_json::{json, Value};
use tracing_test::traced_test;

const API_KEY: &str = "test-key";
// base64("apikey:test-key")
const EXPECTED_AUTH: &str = "Basic YXBpa2V5OnRlc3Qta2V5";

async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn analyze_ok(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth_ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(EXPECTED_AUTH);
    let version_ok = params.get("version").map(String::as_str) == Some("2022-04-07");
    let features_ok = body["features"]["entities"]["limit"] == 20
        && body["features"]["keywords"]["sentiment"] == true
        && body["features"]["emotion"]["document"] == true;
    if !(auth_ok && version_ok && features_ok) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad request" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "entities": [
                { "text": "Acme Corp", "type": "Organization", "confidence": 0.97,
                  "sentiment": { "label": "negative", "score": -0.4 } }
            ],
            "keywords": [
                { "text": "termination fee", "relevance": 0.91,
                  "sentiment": { "label": "neutral" } },
                { "text": "data protection", "relevance": 0.64 }
            ],
            "sentiment": { "document": { "score": 0.62, "label": "positive" } },
            "emotion": { "document": { "emotion": { "joy": 0.5, "fear": 0.1 } } }
        })),
    )
}

// =============================================================================
// Live path
// =============================================================================

#[tokio::test]
async fn test_success_is_real_and_enriched() {
    let base = spawn_stub(Router::new().route("/v1/analyze", post(analyze_ok))).await;
    let client = WatsonNluClient::new(API_KEY, base);

    let result = client.analyze("The supplier may terminate on notice.").await;

    assert_eq!(result.source, NluSource::Real);
    assert!(result.fallback_reason.is_none());
    assert_eq!(result.entities[0].legal_relevance, "high");
    assert_eq!(result.keywords[0].legal_category, "financial");
    assert_eq!(result.keywords[1].sentiment, "neutral");
    assert_eq!(result.sentiment.legal_tone_assessment, "collaborative");
    assert_eq!(result.emotion.get("joy"), Some(&0.5));
    assert_eq!(
        result.risk_indicators,
        vec![
            "High-risk term detected: termination fee",
            "Negative sentiment on legal entity: Acme Corp",
        ]
    );
    assert_eq!(result.compliance_flags, vec!["Regulatory term detected: data protection"]);
    assert_eq!(client.source(), NluSource::Real);
}

#[tokio::test]
async fn test_long_text_is_truncated_before_sending() {
    let app = Router::new().route(
        "/v1/analyze",
        post(|Json(body): Json<Value>| async move {
            let sent = body["text"].as_str().unwrap_or_default().chars().count();
            Json(json!({ "keywords": [{ "text": format!("chars {sent}"), "relevance": 1.0 }] }))
        }),
    );
    let base = spawn_stub(app).await;
    let client = WatsonNluClient::new(API_KEY, base).with_max_chars(100);

    let result = client.try_analyze(&"a".repeat(500)).await.unwrap();
    assert_eq!(result.keywords[0].text, "chars 103");
}

// =============================================================================
// Fallbacks
// =============================================================================

#[tokio::test]
#[traced_test]
async fn test_server_error_falls_back_to_mock() {
    let app = Router::new().route(
        "/v1/analyze",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let base = spawn_stub(app).await;
    let client = WatsonNluClient::new(API_KEY, base);

    let err = client.try_analyze("text").await.unwrap_err();
    assert!(matches!(err, NluError::Status { status: 500, .. }));

    let result = client.analyze("text").await;
    assert_eq!(result.source, NluSource::Mock);
    assert_eq!(
        result.fallback_reason.as_deref(),
        Some("NLU service returned 500: upstream exploded")
    );
    assert_eq!(result.entities, mock_result(None).entities);
    assert!(logs_contain("using mock analysis"));
}

#[tokio::test]
async fn test_timeout_falls_back_to_mock() {
    let app = Router::new().route(
        "/v1/analyze",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let base = spawn_stub(app).await;
    let client = WatsonNluClient::new(API_KEY, base).with_timeout(1);

    let result = client.analyze("text").await;
    assert_eq!(result.source, NluSource::Mock);
    assert_eq!(
        result.fallback_reason.as_deref(),
        Some("NLU request timed out after 1s")
    );
}

#[tokio::test]
async fn test_unreachable_host_falls_back_to_mock() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = WatsonNluClient::new(API_KEY, format!("http://{addr}"));
    let err = client.try_analyze("text").await.unwrap_err();
    assert!(matches!(err, NluError::Network(_)));

    let result = client.analyze("text").await;
    assert_eq!(result.source, NluSource::Mock);
    assert!(result.fallback_reason.is_some());
}

#[tokio::test]
async fn test_undecodable_body_falls_back_to_mock() {
    let app = Router::new().route("/v1/analyze", post(|| async { "not json" }));
    let base = spawn_stub(app).await;
    let client = WatsonNluClient::new(API_KEY, base);

    let err = client.try_analyze("text").await.unwrap_err();
    assert!(matches!(err, NluError::Decode(_)));
}

#[tokio::test]
#[traced_test]
async fn test_missing_credentials_never_calls_out() {
    let client = WatsonNluClient::new("", "");
    let result = client.analyze("text").await;
    assert_eq!(result.source, NluSource::Mock);
    assert_eq!(
        result.fallback_reason.as_deref(),
        Some("NLU credentials not configured")
    );
    assert!(!logs_contain("calling watson nlu"));
}
