use clausewise_core::types::{ToneLabel, ToneScore};

pub const FORMAL_INDICATORS: &[&str] = &["shall", "hereby", "whereas", "pursuant", "notwithstanding"];
pub const ASSERTIVE_INDICATORS: &[&str] = &["must", "required", "mandatory", "obligation", "duty"];
pub const RISK_INDICATORS: &[&str] = &["penalty", "breach", "default", "terminate", "void"];

/// Score formality, assertiveness and risk tone from keyword density.
///
/// Each score is `1 + 100 * hits / words`, clamped to `[1, 10]` and rounded
/// to one decimal. Empty text scores the floor on every axis.
pub fn analyze(text: &str) -> ToneScore {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    let formality = density_score(&words, FORMAL_INDICATORS);
    let assertiveness = density_score(&words, ASSERTIVE_INDICATORS);
    let risk_tone = density_score(&words, RISK_INDICATORS);

    ToneScore {
        formality,
        assertiveness,
        risk_tone,
        risk_label: label_for(risk_tone),
    }
}

fn density_score(words: &[String], indicators: &[&str]) -> f64 {
    if words.is_empty() {
        return 1.0;
    }
    let hits = words
        .iter()
        .filter(|w| indicators.iter().any(|i| is_form_of(w, i)))
        .count();
    let raw = 1.0 + hits as f64 / words.len() as f64 * 100.0;
    (raw.clamp(1.0, 10.0) * 10.0).round() / 10.0
}

/// `word` is the indicator itself or its plural.
fn is_form_of(word: &str, indicator: &str) -> bool {
    word == indicator
        || word
            .strip_prefix(indicator)
            .is_some_and(|rest| rest == "s" || rest == "es")
}

pub fn label_for(risk_tone: f64) -> ToneLabel {
    if risk_tone < 4.0 {
        ToneLabel::Low
    } else if risk_tone < 7.0 {
        ToneLabel::Moderate
    } else {
        ToneLabel::High
    }
}
