use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use clausewise_core::{
    config::{Config, PLACEHOLDER_API_KEY},
    nlu::{truncate_for_nlu, NluClient, NluError},
    types::{NluResult, NluSource},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::legal::{self, RawAnalysis};
use crate::mock::mock_result;

const FEATURE_LIMIT: u32 = 20;

/// Calls IBM Watson Natural Language Understanding over its REST API.
///
/// Any failure (missing credentials, network error, non-2xx status, timeout,
/// undecodable body) yields the mock analysis with `fallback_reason` set.
/// There are no retries.
pub struct WatsonNluClient {
    pub api_key: String,
    pub base_url: String,
    pub version: String,
    pub timeout_secs: u64,
    pub max_chars: usize,
    http: reqwest::Client,
}

impl WatsonNluClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            version: "2022-04-07".into(),
            timeout_secs: 10,
            max_chars: 50_000,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.watson_nlu_apikey, &config.watson_nlu_url)
            .with_version(&config.watson_nlu_version)
            .with_timeout(config.nlu_timeout_s)
            .with_max_chars(config.nlu_max_chars)
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    fn has_credentials(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY && !self.base_url.trim().is_empty()
    }

    /// One request to the live service, without fallback.
    pub async fn try_analyze(&self, text: &str) -> Result<NluResult, NluError> {
        if !self.has_credentials() {
            return Err(NluError::MissingCredentials);
        }

        let text = truncate_for_nlu(text, self.max_chars);
        let body = json!({
            "text": text,
            "features": {
                "entities": { "limit": FEATURE_LIMIT, "sentiment": true },
                "keywords": { "limit": FEATURE_LIMIT, "sentiment": true },
                "sentiment": { "document": true },
                "emotion": { "document": true },
            },
        });
        let url = format!("{}/v1/analyze", self.base_url.trim_end_matches('/'));

        info!(
            base_url = %self.base_url,
            version = %self.version,
            chars = text.len(),
            "calling watson nlu"
        );

        let response = self
            .http
            .post(&url)
            .query(&[("version", self.version.as_str())])
            .basic_auth("apikey", Some(&self.api_key))
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NluError::Timeout(self.timeout_secs)
                } else {
                    NluError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NluError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: WatsonResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                NluError::Timeout(self.timeout_secs)
            } else {
                NluError::Decode(e.to_string())
            }
        })?;

        info!(
            entities = parsed.entities.len(),
            keywords = parsed.keywords.len(),
            "watson nlu response received"
        );

        Ok(legal::build_result(parsed.into_raw()))
    }
}

#[async_trait]
impl NluClient for WatsonNluClient {
    async fn analyze(&self, text: &str) -> NluResult {
        match self.try_analyze(text).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    base_url = %self.base_url,
                    timeout_secs = self.timeout_secs,
                    error = %e,
                    "watson nlu unavailable, using mock analysis"
                );
                mock_result(Some(e.to_string()))
            },
        }
    }

    fn source(&self) -> NluSource {
        NluSource::Real
    }
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct WatsonResponse {
    #[serde(default)]
    entities: Vec<WatsonEntity>,
    #[serde(default)]
    keywords: Vec<WatsonKeyword>,
    #[serde(default)]
    sentiment: Option<WatsonSentiment>,
    #[serde(default)]
    emotion: Option<WatsonEmotion>,
}

#[derive(Debug, Deserialize)]
struct WatsonEntity {
    text: String,
    #[serde(rename = "type", default)]
    entity_type: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    sentiment: Option<WatsonLabel>,
}

#[derive(Debug, Deserialize)]
struct WatsonKeyword {
    text: String,
    #[serde(default)]
    relevance: f64,
    #[serde(default)]
    sentiment: Option<WatsonLabel>,
}

#[derive(Debug, Default, Deserialize)]
struct WatsonLabel {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WatsonSentiment {
    #[serde(default)]
    document: Option<WatsonLabel>,
}

#[derive(Debug, Deserialize)]
struct WatsonEmotion {
    #[serde(default)]
    document: Option<WatsonDocumentEmotion>,
}

#[derive(Debug, Deserialize)]
struct WatsonDocumentEmotion {
    #[serde(default)]
    emotion: BTreeMap<String, f64>,
}

fn label_or_neutral(label: Option<WatsonLabel>) -> String {
    label
        .and_then(|l| l.label)
        .unwrap_or_else(|| "neutral".to_string())
}

impl WatsonResponse {
    fn into_raw(self) -> RawAnalysis {
        let document = self
            .sentiment
            .and_then(|s| s.document)
            .unwrap_or_default();
        RawAnalysis {
            entities: self
                .entities
                .into_iter()
                .map(|e| (e.text, e.entity_type, e.confidence, label_or_neutral(e.sentiment)))
                .collect(),
            keywords: self
                .keywords
                .into_iter()
                .map(|k| (k.text, k.relevance, label_or_neutral(k.sentiment)))
                .collect(),
            sentiment_score: document.score.unwrap_or(0.0),
            sentiment_label: document.label.unwrap_or_else(|| "neutral".to_string()),
            emotion: self
                .emotion
                .and_then(|e| e.document)
                .map(|d| d.emotion)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_sparse_response() {
        let raw: WatsonResponse = serde_json::from_str(
            r#"{"entities":[{"text":"Acme","type":"Organization","confidence":0.9}],
                "sentiment":{"document":{"score":0.7,"label":"positive"}}}"#,
        )
        .unwrap();
        let raw = raw.into_raw();
        assert_eq!(raw.entities[0].3, "neutral");
        assert!(raw.keywords.is_empty());
        assert_eq!(raw.sentiment_label, "positive");
        assert!(raw.emotion.is_empty());
    }

    #[tokio::test]
    async fn placeholder_key_counts_as_missing() {
        let client = WatsonNluClient::new(PLACEHOLDER_API_KEY, "https://nlu.example.test");
        let err = client.try_analyze("text").await.unwrap_err();
        assert!(matches!(err, NluError::MissingCredentials));
    }
}
