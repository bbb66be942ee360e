use std::collections::BTreeMap;

use async_trait::async_trait;
use clausewise_core::nlu::{NluClient, NluError};
use clausewise_core::types::{NluEntity, NluKeyword, NluResult, NluSentiment, NluSource};

fn entity(text: &str, entity_type: &str, confidence: f64, sentiment: &str) -> NluEntity {
    NluEntity {
        text: text.into(),
        entity_type: entity_type.into(),
        confidence,
        sentiment: sentiment.into(),
        legal_relevance: "high".into(),
    }
}

fn keyword(text: &str, relevance: f64, sentiment: &str, legal_category: &str) -> NluKeyword {
    NluKeyword {
        text: text.into(),
        relevance,
        sentiment: sentiment.into(),
        legal_category: legal_category.into(),
    }
}

/// The fixed analysis returned whenever the live service is not used.
/// Identical on every call apart from `fallback_reason`.
pub fn mock_result(fallback_reason: Option<String>) -> NluResult {
    NluResult {
        source: NluSource::Mock,
        fallback_reason,
        summary: "This legal document contains standard contractual clauses with moderate \
                  risk levels and formal neutral tone."
            .into(),
        entities: vec![
            entity("Contract Agreement", "Legal Document", 0.95, "neutral"),
            entity("Payment Terms", "Legal Clause", 0.88, "neutral"),
            entity("Liability Clause", "Legal Clause", 0.82, "negative"),
        ],
        keywords: vec![
            keyword("liability", 0.92, "negative", "risk"),
            keyword("payment", 0.85, "neutral", "financial"),
            keyword("termination", 0.78, "negative", "temporal"),
            keyword("obligations", 0.75, "neutral", "obligations"),
        ],
        sentiment: NluSentiment {
            score: 0.1,
            label: "neutral".into(),
            legal_tone_assessment: "formal_neutral".into(),
        },
        emotion: BTreeMap::from([
            ("anger".to_string(), 0.2),
            ("disgust".to_string(), 0.1),
            ("fear".to_string(), 0.4),
            ("joy".to_string(), 0.3),
            ("sadness".to_string(), 0.2),
        ]),
        risk_indicators: vec![
            "High-risk term detected: liability".into(),
            "High-risk term detected: termination".into(),
        ],
        compliance_flags: Vec::new(),
    }
}

/// Client used when no NLU credentials are configured.
pub struct MockNluClient {
    reason: String,
}

impl MockNluClient {
    pub fn new() -> Self {
        Self {
            reason: NluError::MissingCredentials.to_string(),
        }
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for MockNluClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NluClient for MockNluClient {
    async fn analyze(&self, _text: &str) -> NluResult {
        mock_result(Some(self.reason.clone()))
    }

    fn source(&self) -> NluSource {
        NluSource::Mock
    }
}
