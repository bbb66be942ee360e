use std::time::Duration;

use clausewise_core::types::BoilerplateMatch;
use similar::TextDiff;

/// Word-level similarity at or above this flags a sentence as boilerplate.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Confidence floor for a sentence that contains a template's anchor phrase.
const ANCHOR_CONFIDENCE: f64 = 0.8;

const DIFF_TIMEOUT: Duration = Duration::from_millis(100);

/// (name, anchor phrase, canonical wording)
pub const TEMPLATES: &[(&str, &str, &str)] = &[
    (
        "governing_law",
        "shall be governed by",
        "this agreement shall be governed by and construed in accordance with the laws of the state",
    ),
    (
        "entire_agreement",
        "entire agreement",
        "this agreement constitutes the entire agreement between the parties and supersedes all prior agreements and understandings",
    ),
    (
        "severability",
        "severability",
        "if any provision of this agreement is held invalid or unenforceable the remaining provisions shall continue in full force and effect",
    ),
    (
        "no_waiver",
        "no waiver",
        "no waiver of any provision of this agreement shall be effective unless made in writing",
    ),
    (
        "counterparts",
        "counterparts",
        "this agreement may be executed in counterparts each of which shall be deemed an original",
    ),
    (
        "headings",
        "headings are for convenience only",
        "the headings in this agreement are for convenience only and shall not affect its interpretation",
    ),
];

/// Lowercase and collapse everything but letters and digits to single spaces.
pub fn normalize(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity ratio of two word sequences, `2 * matched / (len_a + len_b)`.
pub fn word_ratio(a: &[&str], b: &[&str]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    f64::from(
        TextDiff::configure()
            .timeout(DIFF_TIMEOUT)
            .diff_slices(a, b)
            .ratio(),
    )
}

fn template_similarity(sentence: &[&str], template: &[&str]) -> f64 {
    // Ratio is bounded by 2*min/(a+b); past this length difference it
    // cannot reach the threshold, so skip the diff.
    if sentence.len() > 3 * template.len() || template.len() > 3 * sentence.len() {
        return 0.0;
    }
    word_ratio(sentence, template)
}

pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Flag sentences that closely follow a generic contract template.
///
/// Each sentence is reported at most once, against the template that gives
/// it the highest confidence.
pub fn detect(text: &str) -> Vec<BoilerplateMatch> {
    let mut out = Vec::new();
    for (id, sentence) in crate::sentences(text) {
        let normalized = normalize(sentence);
        if normalized.is_empty() {
            continue;
        }
        let words: Vec<&str> = normalized.split(' ').collect();
        let mut best: Option<BoilerplateMatch> = None;
        for (name, anchor, template) in TEMPLATES {
            let template_words: Vec<&str> = template.split(' ').collect();
            let similarity = template_similarity(&words, &template_words);
            let anchored = normalized.contains(anchor);
            if !anchored && similarity < SIMILARITY_THRESHOLD {
                continue;
            }
            let confidence = if anchored {
                similarity.max(ANCHOR_CONFIDENCE)
            } else {
                similarity
            };
            if best.as_ref().map_or(true, |b| confidence > b.confidence) {
                best = Some(BoilerplateMatch {
                    id,
                    text: sentence.to_string(),
                    template: (*name).to_string(),
                    similarity: round3(similarity),
                    confidence: round3(confidence),
                });
            }
        }
        out.extend(best);
    }
    out
}
