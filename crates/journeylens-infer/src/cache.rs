//! LRU cache for inference results.
//!
//! Identical phase texts are common across a cohort (and a secondary phase
//! always repeats its parent's text), so results are memoized by input.
//! Only successful results are cached; failures are retried on next call.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use journeylens_core::Result;
use parking_lot::Mutex;

use crate::backend::{SentimentBackend, TopicBackend};
use crate::types::{SentimentResult, TopicResult};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: VecDeque<String>,
    max_size: usize,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl<V> CacheInner<V> {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn forget(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

/// Thread-safe LRU cache keyed by input text.
pub struct ResultCache<V> {
    inner: Mutex<CacheInner<V>>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: VecDeque::with_capacity(max_size),
                max_size,
                ttl,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Cached value, or `None` on miss or expiry.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();

        let lookup = inner
            .entries
            .get(key)
            .map(|e| (e.inserted_at.elapsed() < inner.ttl, e.value.clone()));

        match lookup {
            Some((true, value)) => {
                inner.touch(key);
                inner.hits += 1;
                Some(value)
            }
            Some((false, _)) => {
                inner.forget(key);
                inner.misses += 1;
                None
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub fn put(&self, key: String, value: V) {
        let mut inner = self.inner.lock();
        if inner.max_size == 0 {
            return;
        }

        if inner.entries.contains_key(&key) {
            inner.touch(&key);
        } else {
            while inner.entries.len() >= inner.max_size {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(key.clone());
        }

        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        let inner = self.inner.lock();
        (inner.hits, inner.misses)
    }
}

/// Default TTL; a batch run normally finishes well inside it.
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Sentiment backend with memoized results.
pub struct CachedSentiment {
    inner: Arc<dyn SentimentBackend>,
    cache: ResultCache<SentimentResult>,
}

impl CachedSentiment {
    pub fn new(inner: Arc<dyn SentimentBackend>, max_size: usize) -> Self {
        Self {
            inner,
            cache: ResultCache::new(max_size, DEFAULT_TTL),
        }
    }

    pub fn stats(&self) -> (u64, u64) {
        self.cache.stats()
    }
}

impl SentimentBackend for CachedSentiment {
    fn classify_sentiment(&self, text: &str) -> Result<SentimentResult> {
        if let Some(hit) = self.cache.get(text) {
            return Ok(hit);
        }
        let result = self.inner.classify_sentiment(text)?;
        self.cache.put(text.to_string(), result);
        Ok(result)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Topic backend with memoized results, keyed by candidates and text.
pub struct CachedTopics {
    inner: Arc<dyn TopicBackend>,
    cache: ResultCache<TopicResult>,
}

impl CachedTopics {
    pub fn new(inner: Arc<dyn TopicBackend>, max_size: usize) -> Self {
        Self {
            inner,
            cache: ResultCache::new(max_size, DEFAULT_TTL),
        }
    }

    pub fn stats(&self) -> (u64, u64) {
        self.cache.stats()
    }

    fn key(text: &str, candidates: &[&str]) -> String {
        format!("{}\u{1f}{}", candidates.join("\u{1e}"), text)
    }
}

impl TopicBackend for CachedTopics {
    fn classify_topics(&self, text: &str, candidates: &[&str]) -> Result<TopicResult> {
        let key = Self::key(text, candidates);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let result = self.inner.classify_topics(text, candidates)?;
        self.cache.put(key, result.clone());
        Ok(result)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
