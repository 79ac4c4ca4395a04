//! JourneyLens Infer: sentiment and topic capabilities, result cache.
//!
//! `SentimentBackend` and `TopicBackend` abstract over the classifiers.
//! When an inference endpoint is configured, `HuggingFaceBackend` serves
//! both through hosted transformer pipelines. Without one, the offline
//! `LexiconBackend` is used.

pub mod backend;
pub mod cache;
pub mod lexicon;
pub mod remote;
pub mod types;

pub use backend::{SentimentBackend, TopicBackend, UnavailableBackend};
pub use cache::{CachedSentiment, CachedTopics, ResultCache};
pub use lexicon::LexiconBackend;
pub use remote::HuggingFaceBackend;
pub use types::{SentimentLabel, SentimentResult, TopicResult, FALLBACK_SENTIMENT_SCORE};

use std::sync::Arc;

use journeylens_core::InferenceConfig;

/// The pair of capabilities an enrichment run needs.
#[derive(Clone)]
pub struct Backends {
    pub sentiment: Arc<dyn SentimentBackend>,
    pub topics: Arc<dyn TopicBackend>,
}

impl Backends {
    pub fn new(sentiment: Arc<dyn SentimentBackend>, topics: Arc<dyn TopicBackend>) -> Self {
        Self { sentiment, topics }
    }

    /// Both capabilities missing; every phase takes its fallback value.
    pub fn unavailable(reason: &str) -> Self {
        Self::new(
            Arc::new(UnavailableBackend::new(reason)),
            Arc::new(UnavailableBackend::new(reason)),
        )
    }
}

/// Create the best available backends for the given configuration.
///
/// Uses the hosted endpoint if one is configured and the client builds,
/// falls back to the lexicon backend otherwise.
pub fn create_backends(config: &InferenceConfig) -> Backends {
    let (sentiment, topics): (Arc<dyn SentimentBackend>, Arc<dyn TopicBackend>) = match &config.url {
        Some(url) => match HuggingFaceBackend::new(url, config) {
            Ok(backend) => {
                tracing::info!(
                    "Using hosted inference at {} (sentiment={}, topics={})",
                    url, config.sentiment_model, config.topic_model
                );
                let backend = Arc::new(backend);
                (backend.clone(), backend)
            }
            Err(e) => {
                tracing::warn!("Hosted inference unavailable: {}. Falling back to lexicon.", e);
                (Arc::new(LexiconBackend::new()), Arc::new(LexiconBackend::new()))
            }
        },
        None => {
            tracing::info!("No inference endpoint configured. Using lexicon backend.");
            (Arc::new(LexiconBackend::new()), Arc::new(LexiconBackend::new()))
        }
    };

    if config.cache_size == 0 {
        return Backends::new(sentiment, topics);
    }

    Backends::new(
        Arc::new(CachedSentiment::new(sentiment, config.cache_size)),
        Arc::new(CachedTopics::new(topics, config.cache_size)),
    )
}
