use std::collections::BTreeMap;

use clausewise_core::types::{ClauseMatch, ClauseType, ComparisonReport, TypeCountDiff};

use crate::boilerplate::{normalize, round3, word_ratio};
use crate::risk;

fn type_counts(clauses: &[ClauseMatch]) -> BTreeMap<ClauseType, usize> {
    let mut counts = BTreeMap::new();
    for c in clauses {
        *counts.entry(c.clause_type).or_insert(0) += 1;
    }
    counts
}

/// Contrast two already-classified documents.
pub fn build_report(
    doc1_text: &str,
    doc1_clauses: &[ClauseMatch],
    doc2_text: &str,
    doc2_clauses: &[ClauseMatch],
) -> ComparisonReport {
    let counts1 = type_counts(doc1_clauses);
    let counts2 = type_counts(doc2_clauses);

    let mut doc1_unique_types = Vec::new();
    let mut doc2_unique_types = Vec::new();
    let mut common_types = Vec::new();
    let mut type_differences = Vec::new();

    for clause_type in ClauseType::ALL {
        let doc1_count = counts1.get(&clause_type).copied().unwrap_or(0);
        let doc2_count = counts2.get(&clause_type).copied().unwrap_or(0);
        match (doc1_count > 0, doc2_count > 0) {
            (true, true) => common_types.push(clause_type),
            (true, false) => doc1_unique_types.push(clause_type),
            (false, true) => doc2_unique_types.push(clause_type),
            (false, false) => continue,
        }
        type_differences.push(TypeCountDiff {
            clause_type,
            doc1_count,
            doc2_count,
        });
    }

    let norm1 = normalize(doc1_text);
    let norm2 = normalize(doc2_text);
    let words1: Vec<&str> = norm1.split_whitespace().collect();
    let words2: Vec<&str> = norm2.split_whitespace().collect();

    ComparisonReport {
        doc1_unique_types,
        doc2_unique_types,
        common_types,
        type_differences,
        doc1_risk: risk::assess(doc1_text),
        doc2_risk: risk::assess(doc2_text),
        text_similarity: round3(word_ratio(&words1, &words2)),
    }
}
