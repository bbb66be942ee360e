//! Legal post-processing of raw NLU output: relevance, categories, tone,
//! risk indicators, compliance flags and a one-line summary.

use std::collections::BTreeMap;

use clausewise_core::types::{NluEntity, NluKeyword, NluResult, NluSentiment, NluSource};

const LEGAL_ENTITY_TYPES: &[&str] = &["Person", "Organization", "Location", "Money", "Date"];
const LEGAL_ENTITY_TERMS: &[&str] = &[
    "contract",
    "agreement",
    "liability",
    "damages",
    "breach",
    "termination",
];

/// Checked in order; the first category with a matching term wins.
const KEYWORD_CATEGORIES: &[(&str, &[&str])] = &[
    ("risk", &["risk", "liability", "damages", "penalty", "breach", "default"]),
    (
        "obligations",
        &["shall", "must", "required", "obligation", "duty", "responsibility"],
    ),
    (
        "financial",
        &["payment", "fee", "cost", "price", "compensation", "remuneration"],
    ),
    ("temporal", &["term", "duration", "deadline", "expiry", "termination"]),
    (
        "legal_process",
        &["court", "arbitration", "mediation", "jurisdiction", "governing law"],
    ),
];

const HIGH_RISK_TERMS: &[&str] = &[
    "penalty",
    "liquidated damages",
    "breach",
    "default",
    "termination",
    "void",
];

const REGULATORY_TERMS: &[&str] = &["regulation", "compliance", "gdpr", "privacy", "data protection"];

pub fn legal_relevance(text: &str, entity_type: &str) -> &'static str {
    let lower = text.to_lowercase();
    if LEGAL_ENTITY_TYPES.contains(&entity_type) || LEGAL_ENTITY_TERMS.iter().any(|t| lower.contains(t)) {
        "high"
    } else {
        "medium"
    }
}

pub fn legal_category(keyword: &str) -> &'static str {
    let lower = keyword.to_lowercase();
    KEYWORD_CATEGORIES
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| lower.contains(t)))
        .map(|(category, _)| *category)
        .unwrap_or("general")
}

pub fn legal_tone(label: &str, score: f64) -> &'static str {
    match label {
        "positive" if score > 0.5 => "collaborative",
        "negative" if score < -0.5 => "adversarial",
        _ => "formal_neutral",
    }
}

pub fn risk_indicators(entities: &[NluEntity], keywords: &[NluKeyword]) -> Vec<String> {
    let mut out: Vec<String> = keywords
        .iter()
        .filter(|k| {
            let lower = k.text.to_lowercase();
            HIGH_RISK_TERMS.iter().any(|t| lower.contains(t))
        })
        .map(|k| format!("High-risk term detected: {}", k.text))
        .collect();
    out.extend(
        entities
            .iter()
            .filter(|e| e.sentiment == "negative" && e.legal_relevance == "high")
            .map(|e| format!("Negative sentiment on legal entity: {}", e.text)),
    );
    out
}

pub fn compliance_flags(keywords: &[NluKeyword]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| {
            let lower = k.text.to_lowercase();
            REGULATORY_TERMS.iter().any(|t| lower.contains(t))
        })
        .map(|k| format!("Regulatory term detected: {}", k.text))
        .collect()
}

pub fn summary(entities: &[NluEntity], keywords: &[NluKeyword], tone: &str) -> String {
    let mut parts = Vec::new();
    let relevant = entities.iter().filter(|e| e.legal_relevance == "high").count();
    if relevant > 0 {
        parts.push(format!("Document contains {relevant} legally relevant entities"));
    }
    let risky = keywords.iter().filter(|k| k.legal_category == "risk").count();
    if risky > 0 {
        parts.push(format!("Identified {risky} risk-related terms"));
    }
    parts.push(format!("Overall legal tone is {tone}"));
    format!("{}.", parts.join(". "))
}

/// Raw service output, before legal enrichment.
#[derive(Debug, Clone, Default)]
pub struct RawAnalysis {
    /// (text, type, confidence, sentiment label)
    pub entities: Vec<(String, String, f64, String)>,
    /// (text, relevance, sentiment label)
    pub keywords: Vec<(String, f64, String)>,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub emotion: BTreeMap<String, f64>,
}

/// Enrich raw service output into a `source = real` result.
pub fn build_result(raw: RawAnalysis) -> NluResult {
    let entities: Vec<NluEntity> = raw
        .entities
        .into_iter()
        .map(|(text, entity_type, confidence, sentiment)| NluEntity {
            legal_relevance: legal_relevance(&text, &entity_type).to_string(),
            text,
            entity_type,
            confidence,
            sentiment,
        })
        .collect();
    let keywords: Vec<NluKeyword> = raw
        .keywords
        .into_iter()
        .map(|(text, relevance, sentiment)| NluKeyword {
            legal_category: legal_category(&text).to_string(),
            text,
            relevance,
            sentiment,
        })
        .collect();

    let tone = legal_tone(&raw.sentiment_label, raw.sentiment_score);
    NluResult {
        source: NluSource::Real,
        fallback_reason: None,
        summary: summary(&entities, &keywords, tone),
        risk_indicators: risk_indicators(&entities, &keywords),
        compliance_flags: compliance_flags(&keywords),
        sentiment: NluSentiment {
            score: raw.sentiment_score,
            label: raw.sentiment_label,
            legal_tone_assessment: tone.to_string(),
        },
        emotion: raw.emotion,
        entities,
        keywords,
    }
}
