//! Heuristic contract analysis: clause classification, risk rating,
//! timeline extraction, tone scoring, boilerplate detection, rewrite
//! suggestions and document comparison.
//!
//! Everything here is pure and synchronous. Pattern tables are compiled once
//! in [`Analyzer::new`] and shared read-only afterwards.

pub mod boilerplate;
pub mod clauses;
pub mod compare;
pub mod risk;
pub mod suggestions;
pub mod timeline;
pub mod tone;

use std::collections::BTreeMap;

use anyhow::Result;
use clausewise_core::types::{
    AnalysisStatistics, BoilerplateMatch, ClauseMatch, ComparisonReport, DocumentAnalysis,
    RiskAssessment, TimelineEntry, ToneScore,
};
use tracing::debug;

use crate::clauses::ClauseClassifier;
use crate::timeline::TimelineExtractor;

/// Split on `.` and trim. The index is the sentence id used by every
/// per-sentence result.
pub(crate) fn sentences(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('.').map(str::trim).enumerate()
}

pub struct Analyzer {
    clauses: ClauseClassifier,
    timeline: TimelineExtractor,
}

impl Analyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            clauses: ClauseClassifier::new()?,
            timeline: TimelineExtractor::new()?,
        })
    }

    pub fn classify_clauses(&self, text: &str) -> Vec<ClauseMatch> {
        self.clauses.classify(text)
    }

    pub fn assess_risk(&self, text: &str) -> RiskAssessment {
        risk::assess(text)
    }

    pub fn extract_timeline(&self, text: &str) -> Vec<TimelineEntry> {
        self.timeline.extract(text)
    }

    pub fn analyze_tone(&self, text: &str) -> ToneScore {
        tone::analyze(text)
    }

    pub fn detect_boilerplate(&self, text: &str) -> Vec<BoilerplateMatch> {
        boilerplate::detect(text)
    }

    /// Run every heuristic over `text`.
    pub fn analyze(&self, text: &str) -> DocumentAnalysis {
        let clauses = self.classify_clauses(text);
        let suggestions = suggestions::suggest(&clauses);
        let statistics = statistics(&clauses);
        let analysis = DocumentAnalysis {
            risk: self.assess_risk(text),
            timeline: self.extract_timeline(text),
            tone: self.analyze_tone(text),
            boilerplate: self.detect_boilerplate(text),
            suggestions,
            statistics,
            clauses,
        };
        debug!(
            chars = text.len(),
            clauses = analysis.clauses.len(),
            risk = analysis.risk.level.as_str(),
            timeline = analysis.timeline.len(),
            boilerplate = analysis.boilerplate.len(),
            "document analyzed"
        );
        analysis
    }

    pub fn compare(&self, doc1_text: &str, doc2_text: &str) -> ComparisonReport {
        let doc1 = self.classify_clauses(doc1_text);
        let doc2 = self.classify_clauses(doc2_text);
        compare::build_report(doc1_text, &doc1, doc2_text, &doc2)
    }
}

/// Aggregate counts over clause matches. The importance average counts each
/// classified sentence once.
pub fn statistics(clauses: &[ClauseMatch]) -> AnalysisStatistics {
    let mut risk_distribution = BTreeMap::new();
    let mut clause_type_distribution = BTreeMap::new();
    let mut importance_sum: u32 = 0;
    let mut classified_sentences = 0usize;
    let mut last_id = None;

    for c in clauses {
        *clause_type_distribution.entry(c.clause_type).or_insert(0) += 1;
        *risk_distribution.entry(c.risk_level).or_insert(0) += 1;
        if last_id == Some(c.id) {
            continue;
        }
        last_id = Some(c.id);
        classified_sentences += 1;
        importance_sum += u32::from(c.importance_score);
    }

    let avg_importance_score = if classified_sentences == 0 {
        0.0
    } else {
        (f64::from(importance_sum) / classified_sentences as f64 * 100.0).round() / 100.0
    };

    AnalysisStatistics {
        total_clauses: clauses.len(),
        classified_sentences,
        risk_distribution,
        clause_type_distribution,
        avg_importance_score,
    }
}
