use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Requests ─────────────────────────────────────────────────────────────

/// Body of `/api/analyze` and `/api/watson-nlu`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
}

/// Body of `/api/compare`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub doc1_text: String,
    pub doc2_text: String,
}

// ── Clause classification ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseType {
    Payment,
    Termination,
    Liability,
    Confidentiality,
    IntellectualProperty,
    Warranty,
    DisputeResolution,
    ForceMajeure,
    GoverningLaw,
    Amendment,
}

impl ClauseType {
    /// Every clause type, in classification order.
    pub const ALL: [ClauseType; 10] = [
        Self::Payment,
        Self::Termination,
        Self::Liability,
        Self::Confidentiality,
        Self::IntellectualProperty,
        Self::Warranty,
        Self::DisputeResolution,
        Self::ForceMajeure,
        Self::GoverningLaw,
        Self::Amendment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Termination => "termination",
            Self::Liability => "liability",
            Self::Confidentiality => "confidentiality",
            Self::IntellectualProperty => "intellectual_property",
            Self::Warranty => "warranty",
            Self::DisputeResolution => "dispute_resolution",
            Self::ForceMajeure => "force_majeure",
            Self::GoverningLaw => "governing_law",
            Self::Amendment => "amendment",
        }
    }

    /// Types that weigh more heavily in the importance score.
    pub fn is_high_importance(&self) -> bool {
        matches!(
            self,
            Self::Liability | Self::Payment | Self::Termination | Self::IntellectualProperty
        )
    }
}

impl std::fmt::Display for ClauseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clause type detected in one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseMatch {
    /// Index of the sentence the match came from.
    pub id: usize,
    pub clause_type: ClauseType,
    /// The trimmed sentence text.
    pub matched_span: String,
    /// The first term of the clause type's matchers found in the sentence.
    pub matched_term: String,
    pub confidence_score: f64,
    pub risk_level: RiskLevel,
    pub importance_score: u8,
}

// ── Risk ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Keywords of the winning tier that occur in the text, sorted.
    pub triggering_keywords: Vec<String>,
}

// ── Timeline ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().trim_end_matches('s') {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineValue {
    /// `date` is `None` when the text looks like a date but is not a valid one.
    Date { date: Option<NaiveDate> },
    Duration {
        amount: u64,
        unit: DurationUnit,
        #[serde(skip_serializing_if = "Option::is_none")]
        qualifier: Option<String>,
    },
    Deadline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub sentence_id: usize,
    pub raw_text: String,
    #[serde(flatten)]
    pub value: TimelineValue,
}

// ── Tone ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneLabel {
    Low,
    Moderate,
    High,
}

/// Keyword-density tone scores, each in `[1.0, 10.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneScore {
    pub formality: f64,
    pub assertiveness: f64,
    pub risk_tone: f64,
    pub risk_label: ToneLabel,
}

// ── Boilerplate / suggestions ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoilerplateMatch {
    pub id: usize,
    pub text: String,
    /// Name of the generic template the sentence resembles.
    pub template: String,
    pub similarity: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteSuggestion {
    pub clause_id: usize,
    pub original_text: String,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

// ── Aggregates ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub total_clauses: usize,
    pub classified_sentences: usize,
    pub risk_distribution: BTreeMap<RiskLevel, usize>,
    pub clause_type_distribution: BTreeMap<ClauseType, usize>,
    pub avg_importance_score: f64,
}

/// Full heuristic analysis of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub clauses: Vec<ClauseMatch>,
    pub risk: RiskAssessment,
    pub timeline: Vec<TimelineEntry>,
    pub tone: ToneScore,
    pub boilerplate: Vec<BoilerplateMatch>,
    pub suggestions: Vec<RewriteSuggestion>,
    pub statistics: AnalysisStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCountDiff {
    pub clause_type: ClauseType,
    pub doc1_count: usize,
    pub doc2_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub doc1_unique_types: Vec<ClauseType>,
    pub doc2_unique_types: Vec<ClauseType>,
    pub common_types: Vec<ClauseType>,
    /// Per-type match counts for every type present in either document.
    pub type_differences: Vec<TypeCountDiff>,
    pub doc1_risk: RiskAssessment,
    pub doc2_risk: RiskAssessment,
    /// Word-level similarity ratio of the two texts, in `[0, 1]`.
    pub text_similarity: f64,
}

// ── NLU ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NluSource {
    Real,
    Mock,
}

impl NluSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluEntity {
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub confidence: f64,
    pub sentiment: String,
    pub legal_relevance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluKeyword {
    pub text: String,
    pub relevance: f64,
    pub sentiment: String,
    pub legal_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluSentiment {
    pub score: f64,
    pub label: String,
    pub legal_tone_assessment: String,
}

/// Result of the NLU adapter, either from the live service or the mock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluResult {
    pub source: NluSource,
    /// Why the live service was not used, when `source` is `mock`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub summary: String,
    pub entities: Vec<NluEntity>,
    pub keywords: Vec<NluKeyword>,
    pub sentiment: NluSentiment,
    pub emotion: BTreeMap<String, f64>,
    pub risk_indicators: Vec<String>,
    pub compliance_flags: Vec<String>,
}
