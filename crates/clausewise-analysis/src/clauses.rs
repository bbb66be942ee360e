use anyhow::{Context, Result};
use clausewise_core::types::{ClauseMatch, ClauseType};
use regex::Regex;

use crate::risk;

/// Sentences shorter than this (after trimming) are never classified.
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Ordered matchers per clause type. The first matcher that hits supplies
/// `matched_term`; the number of distinct hits drives confidence.
pub const CLAUSE_TABLE: &[(ClauseType, &[&str])] = &[
    (
        ClauseType::Payment,
        &[
            r"(?i)\bpayments?\b",
            r"(?i)\b(?:pay|pays|paid|payable)\b",
            r"(?i)\bfees?\b",
            r"(?i)\bcosts?\b",
            r"(?i)\bprices?\b",
            r"(?i)\bremunerat\w*",
            r"(?i)\bcompensat\w*",
            r"(?i)\brent\b",
            r"(?i)\binvoic\w*",
        ],
    ),
    (
        ClauseType::Termination,
        &[
            r"(?i)\bterminat\w*",
            r"(?i)\bend(?:s|ed)?\b",
            r"(?i)\bexpir\w*",
            r"(?i)\bcancel\w*",
            r"(?i)\bdissol\w*",
        ],
    ),
    (
        ClauseType::Liability,
        &[
            r"(?i)\bliab\w*",
            r"(?i)\bresponsib\w*",
            r"(?i)\bdamages\b",
            r"(?i)\bloss(?:es)?\b",
            r"(?i)\bindemn\w*",
        ],
    ),
    (
        ClauseType::Confidentiality,
        &[
            r"(?i)\bconfidential\w*",
            r"(?i)\bnon-disclosure\b",
            r"(?i)\bproprietary\b",
            r"(?i)\btrade secrets?\b",
        ],
    ),
    (
        ClauseType::IntellectualProperty,
        &[
            r"(?i)\bcopyright\w*",
            r"(?i)\bpatent\w*",
            r"(?i)\btrademark\w*",
            r"(?i)\bintellectual property\b",
            r"\bIP\b",
        ],
    ),
    (
        ClauseType::Warranty,
        &[
            r"(?i)\bwarrant\w*",
            r"(?i)\bguarant\w*",
            r"(?i)\brepresentations?\b",
            r"(?i)\bconditions?\b",
        ],
    ),
    (
        ClauseType::DisputeResolution,
        &[
            r"(?i)\bdisputes?\b",
            r"(?i)\barbitrat\w*",
            r"(?i)\bmediat\w*",
            r"(?i)\bcourts?\b",
            r"(?i)\bjurisdiction\w*",
        ],
    ),
    (
        ClauseType::ForceMajeure,
        &[
            r"(?i)\bforce majeure\b",
            r"(?i)\bacts? of god\b",
            r"(?i)\bunforeseeable\b",
            r"(?i)\bbeyond\s+(?:[\w']+\s+){0,2}control\b",
        ],
    ),
    (
        ClauseType::GoverningLaw,
        &[
            r"(?i)\bgoverning law\b",
            r"(?i)\bapplicable law\b",
            r"(?i)\bgoverned by\b",
            r"(?i)\bjurisdiction\w*",
            r"(?i)\bvenue\b",
        ],
    ),
    (
        ClauseType::Amendment,
        &[
            r"(?i)\bamend\w*",
            r"(?i)\bmodif(?:y|ied|ies|ication)\w*",
            r"(?i)\bchanges?\b",
            r"(?i)\balter\w*",
            r"(?i)\bupdat\w*",
        ],
    ),
];

const LEGAL_WEIGHT_KEYWORDS: &[&str] = &["shall", "liable", "damages", "breach", "default"];

pub struct ClauseClassifier {
    table: Vec<(ClauseType, Vec<Regex>)>,
}

impl ClauseClassifier {
    pub fn new() -> Result<Self> {
        let mut table = Vec::with_capacity(CLAUSE_TABLE.len());
        for (clause_type, patterns) in CLAUSE_TABLE {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).with_context(|| format!("bad {clause_type} pattern {p:?}")))
                .collect::<Result<Vec<_>>>()?;
            table.push((*clause_type, compiled));
        }
        Ok(Self { table })
    }

    /// Every clause type detected in one sentence, with the first matched
    /// term and the number of distinct matchers that hit.
    fn types_in(&self, sentence: &str) -> Vec<(ClauseType, String, usize)> {
        let mut found = Vec::new();
        for (clause_type, matchers) in &self.table {
            let mut first: Option<String> = None;
            let mut hits = 0usize;
            for re in matchers {
                if let Some(m) = re.find(sentence) {
                    hits += 1;
                    if first.is_none() {
                        first = Some(m.as_str().to_string());
                    }
                }
            }
            if let Some(term) = first {
                found.push((*clause_type, term, hits));
            }
        }
        found
    }

    pub fn classify(&self, text: &str) -> Vec<ClauseMatch> {
        let mut out = Vec::new();
        for (id, sentence) in crate::sentences(text) {
            if sentence.chars().count() < MIN_SENTENCE_CHARS {
                continue;
            }
            let types = self.types_in(sentence);
            if types.is_empty() {
                continue;
            }
            let risk_level = risk::assess(sentence).level;
            let importance_score =
                importance_score(sentence, types.iter().map(|(t, _, _)| *t));
            for (clause_type, matched_term, hits) in types {
                out.push(ClauseMatch {
                    id,
                    clause_type,
                    matched_span: sentence.to_string(),
                    matched_term,
                    confidence_score: confidence(hits),
                    risk_level,
                    importance_score,
                });
            }
        }
        out
    }
}

fn confidence(hits: usize) -> f64 {
    let raw = 0.5 + 0.15 * hits as f64;
    (raw.min(0.95) * 100.0).round() / 100.0
}

/// Importance on a 1-10 scale: weighty clause types, length and legal
/// keywords raise it from a base of 5.
pub fn importance_score(sentence: &str, types: impl Iterator<Item = ClauseType>) -> u8 {
    let mut score: u32 = 5;
    score += 2 * types.filter(ClauseType::is_high_importance).count() as u32;
    if sentence.chars().count() > 200 {
        score += 1;
    }
    let lower = sentence.to_lowercase();
    let keyword_hits = LEGAL_WEIGHT_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count() as u32;
    score += keyword_hits.min(3);
    score.min(10) as u8
}
