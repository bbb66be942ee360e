use async_trait::async_trait;

use crate::types::{NluResult, NluSource};

/// Why the live NLU service could not be used. Never surfaced to HTTP
/// callers; adapters turn it into a mock result with `fallback_reason` set.
#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("NLU credentials not configured")]
    MissingCredentials,

    #[error("NLU request timed out after {0}s")]
    Timeout(u64),

    #[error("NLU request failed: {0}")]
    Network(String),

    #[error("NLU service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("NLU response could not be decoded: {0}")]
    Decode(String),
}

/// External natural-language-understanding service.
///
/// `analyze` is infallible by contract: implementations that talk to a
/// remote service fall back to mock data on any failure.
#[async_trait]
pub trait NluClient: Send + Sync {
    async fn analyze(&self, text: &str) -> NluResult;

    /// Which kind of result this client produces when healthy.
    fn source(&self) -> NluSource;
}

/// Truncate `text` to at most `max_chars` chars, appending `...` when cut.
pub fn truncate_for_nlu(text: &str, max_chars: usize) -> std::borrow::Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]).into(),
        None => text.into(),
    }
}
