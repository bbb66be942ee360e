use clausewise_core::types::{ClauseMatch, RewriteSuggestion, RiskLevel};

/// Importance at or above this earns a suggestion regardless of risk.
const IMPORTANCE_THRESHOLD: u8 = 8;
const LONG_SENTENCE_CHARS: usize = 300;
const FINANCIAL_RISK_TERMS: &[&str] = &["penalty", "forfeit", "liquidated damages"];

fn has_word(words: &[String], word: &str) -> bool {
    words.iter().any(|w| w == word)
}

/// Rewriting hints for high-risk or high-importance sentences.
///
/// Matches are grouped by sentence, so a sentence classified under several
/// clause types yields at most one suggestion. Sentences with no concrete
/// issue are left out.
pub fn suggest(clauses: &[ClauseMatch]) -> Vec<RewriteSuggestion> {
    let mut out = Vec::new();
    let mut last_id = None;
    for clause in clauses {
        if last_id == Some(clause.id) {
            continue;
        }
        last_id = Some(clause.id);
        if clause.risk_level != RiskLevel::High && clause.importance_score < IMPORTANCE_THRESHOLD {
            continue;
        }

        let lower = clause.matched_span.to_lowercase();
        let words: Vec<String> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();

        let mut issues = Vec::new();
        let mut suggestions = Vec::new();

        if has_word(&words, "may") {
            issues.push("Ambiguous language: \"may\" creates uncertainty".to_string());
            suggestions.push("Replace \"may\" with \"shall\" or \"will\" for clarity".to_string());
        }
        if has_word(&words, "reasonable") && !lower.contains("commercially reasonable") {
            issues.push("Vague standard: \"reasonable\" is subjective".to_string());
            suggestions.push("Define specific criteria for what constitutes \"reasonable\"".to_string());
        }
        if clause.matched_span.chars().count() > LONG_SENTENCE_CHARS {
            issues.push("Overly complex sentence structure".to_string());
            suggestions.push("Break into shorter, clearer sentences".to_string());
        }
        if FINANCIAL_RISK_TERMS.iter().any(|t| lower.contains(t)) {
            issues.push("High financial risk language".to_string());
            suggestions.push("Consider adding caps or limitations on penalties".to_string());
        }
        if issues.is_empty() {
            continue;
        }

        out.push(RewriteSuggestion {
            clause_id: clause.id,
            original_text: clause.matched_span.clone(),
            issues,
            suggestions,
        });
    }
    out
}
