use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use clausewise_core::{
    ingest::{sanitize_filename, IngestError},
    types::{AnalysisRequest, CompareRequest, ComparisonReport, DocumentAnalysis, NluResult},
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::AppState;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("{0}")]
    InvalidRequestBody(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Internal(String),
}

pub(crate) fn internal(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("internal error: {e}");
    ApiError::Internal("internal server error".into())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Ingest(IngestError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Ingest(IngestError::FileTooLarge { .. }) | ApiError::PayloadTooLarge(_) => {
                StatusCode::PAYLOAD_TOO_LARGE
            },
            ApiError::Ingest(IngestError::ExtractionFailure(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Ingest(IngestError::Io(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };

        let message = match self {
            ApiError::Ingest(IngestError::Io(e)) => {
                tracing::error!("upload i/o error: {e}");
                "internal server error".to_string()
            },
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::PayloadTooLarge(rejection.body_text()))
        },
        Err(rejection) => Err(ApiError::InvalidRequestBody(rejection.body_text())),
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::InvalidRequestBody(format!("Multipart error: {}", e.body_text()))
    }
}

/// Size-check request text and reject blank input.
fn require_text(state: &AppState, text: String, field: &str) -> Result<String, ApiError> {
    let text = state.ingestor.ingest_text(text)?;
    if text.trim().is_empty() {
        return Err(ApiError::InvalidRequestBody(format!("No {field} provided")));
    }
    Ok(text)
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn index() -> &'static str {
    "ClauseWise legal document analyzer API. See /api/health."
}

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_s": state.start_time.elapsed().as_secs(),
        "nlu_source": state.nlu.source().as_str(),
    }))
}

pub(crate) async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::InvalidRequestBody(e.body_text()))?;

    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(sanitize_filename).unwrap_or_default();
        let data = field.bytes().await.map_err(multipart_error)?;
        file = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        file.ok_or_else(|| ApiError::InvalidRequestBody("No file provided".into()))?;
    if filename.is_empty() {
        return Err(ApiError::InvalidRequestBody("No file selected".into()));
    }

    let doc = match state.ingestor.ingest_file(&filename, &data).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(filename = %filename, bytes = data.len(), "upload rejected: {e}");
            return Err(e.into());
        },
    };

    info!(
        filename = %doc.filename,
        format = doc.format.extension(),
        chars = doc.text.len(),
        "document uploaded"
    );

    Ok(Json(json!({
        "filename": doc.filename,
        "format": doc.format,
        "file_id": doc.file_id,
        "char_count": doc.text.chars().count(),
        "text_preview": doc.preview(),
        "text": doc.text,
    })))
}

pub(crate) async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<DocumentAnalysis>, ApiError> {
    let req = json_body(payload)?;
    let text = require_text(&state, req.text, "text")?;

    let worker = Arc::clone(&state);
    let analysis = tokio::task::spawn_blocking(move || worker.analyzer.analyze(&text))
        .await
        .map_err(internal)?;

    info!(
        source_filename = req.source_filename.as_deref().unwrap_or("-"),
        clauses = analysis.clauses.len(),
        risk = analysis.risk.level.as_str(),
        "analysis complete"
    );
    Ok(Json(analysis))
}

pub(crate) async fn compare(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<ComparisonReport>, ApiError> {
    let req = json_body(payload)?;
    let doc1 = require_text(&state, req.doc1_text, "doc1_text")?;
    let doc2 = require_text(&state, req.doc2_text, "doc2_text")?;

    let worker = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || worker.analyzer.compare(&doc1, &doc2))
        .await
        .map_err(internal)?;

    Ok(Json(report))
}

pub(crate) async fn watson_nlu(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<NluResult>, ApiError> {
    let req = json_body(payload)?;
    let text = require_text(&state, req.text, "text")?;
    let result = state.nlu.analyze(&text).await;
    info!(
        source = result.source.as_str(),
        entities = result.entities.len(),
        "nlu analysis complete"
    );
    Ok(Json(result))
}
