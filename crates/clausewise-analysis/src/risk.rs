use std::collections::BTreeSet;

use clausewise_core::types::{RiskAssessment, RiskLevel};

pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    "penalty",
    "breach",
    "default",
    "liquidated damages",
    "forfeit",
    "void",
    "null",
];

pub const MEDIUM_RISK_KEYWORDS: &[&str] = &[
    "may",
    "discretion",
    "reasonable",
    "commercially reasonable",
    "best efforts",
    "terminate",
    "termination",
];

pub const LOW_RISK_KEYWORDS: &[&str] = &["shall", "will", "must", "required", "mandatory"];

const TIERS: [(RiskLevel, &[&str]); 3] = [
    (RiskLevel::High, HIGH_RISK_KEYWORDS),
    (RiskLevel::Medium, MEDIUM_RISK_KEYWORDS),
    (RiskLevel::Low, LOW_RISK_KEYWORDS),
];

/// Rate `text` by the highest keyword tier that appears in it.
///
/// Keywords are matched as case-insensitive substrings. Text with no
/// keyword at all is `low` with no triggers.
pub fn assess(text: &str) -> RiskAssessment {
    let lower = text.to_lowercase();
    for (level, keywords) in TIERS {
        let hits: BTreeSet<&str> = keywords
            .iter()
            .copied()
            .filter(|k| lower.contains(k))
            .collect();
        if !hits.is_empty() {
            return RiskAssessment {
                level,
                triggering_keywords: hits.into_iter().map(String::from).collect(),
            };
        }
    }
    RiskAssessment {
        level: RiskLevel::Low,
        triggering_keywords: Vec::new(),
    }
}
