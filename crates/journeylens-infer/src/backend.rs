//! Capability traits for sentiment and topic inference.
//!
//! Implementations:
//! - `HuggingFaceBackend`: hosted transformer pipelines over HTTP
//! - `LexiconBackend`: offline keyword heuristics
//! - `UnavailableBackend`: always fails, so every phase falls back

use journeylens_core::{Error, Result};

use crate::types::{SentimentResult, TopicResult};

/// Classifies the sentiment of a text.
pub trait SentimentBackend: Send + Sync {
    fn classify_sentiment(&self, text: &str) -> Result<SentimentResult>;

    /// Backend name for logs and run metadata.
    fn name(&self) -> &str;
}

/// Scores a text against candidate topics (multi-label; scores need not sum to 1).
pub trait TopicBackend: Send + Sync {
    fn classify_topics(&self, text: &str, candidates: &[&str]) -> Result<TopicResult>;

    fn name(&self) -> &str;
}

/// Backend with no model behind it.
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl SentimentBackend for UnavailableBackend {
    fn classify_sentiment(&self, _text: &str) -> Result<SentimentResult> {
        Err(Error::Inference(format!("sentiment unavailable: {}", self.reason)))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

impl TopicBackend for UnavailableBackend {
    fn classify_topics(&self, _text: &str, _candidates: &[&str]) -> Result<TopicResult> {
        Err(Error::Inference(format!("topics unavailable: {}", self.reason)))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
