//! Offline keyword heuristics for sentiment and topics.
//!
//! Used when no hosted inference endpoint is configured. Sentiment counts
//! polarity words; topics score each candidate by how many of its cue
//! stems occur in the text.

use std::collections::HashMap;

use journeylens_core::Result;
use once_cell::sync::Lazy;

use crate::backend::{SentimentBackend, TopicBackend};
use crate::types::{SentimentLabel, SentimentResult, TopicResult};

/// Confidence reported for NEUTRAL when the text carries no polarity words.
const NO_EVIDENCE_CONFIDENCE: f64 = 0.6;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "happy", "relieved", "relief", "improved", "improving",
    "improvement", "better", "satisfied", "hopeful", "grateful", "helpful", "supportive",
    "recovered", "recovering", "stable", "well", "progress", "positive", "comfortable",
    "reassured", "effective", "successful", "calm",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worse", "worsened", "worsening", "pain", "painful", "worried", "worry",
    "anxious", "anxiety", "afraid", "scared", "frustrated", "frustrating", "difficult",
    "severe", "delay", "delayed", "ignored", "dismissed", "depressed", "sad", "tired",
    "exhausted", "struggling", "unbearable", "fear", "negative", "angry", "stress",
    "stressful",
];

/// Topic → cue stems, matched as lowercase substrings.
static TOPIC_CUES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    m.insert(
        "symptoms",
        &["symptom", "pain", "ache", "fatigue", "fever", "nausea", "dizz", "swelling", "cough", "bleeding"],
    );
    m.insert(
        "diagnosis",
        &["diagnos", "biopsy", "scan", "mri", "x-ray", "blood test", "test result", "confirmed"],
    );
    m.insert(
        "treatment",
        &["treat", "therapy", "surgery", "chemo", "radiation", "procedure", "operation"],
    );
    m.insert(
        "medication",
        &["medication", "medicine", "drug", "pill", "prescri", "dose", "tablet"],
    );
    m.insert(
        "side effects",
        &["side effect", "nausea", "hair loss", "reaction", "adverse", "rash", "vomit"],
    );
    m.insert(
        "doctor visits",
        &["doctor", "appointment", "visit", "clinic", "specialist", "hospital", "consult", "gp "],
    );
    m.insert(
        "emotional state",
        &["worr", "anxi", "afraid", "scared", "stress", "depress", "happy", "relie", "frustrat", "hope", "fear"],
    );
    m.insert(
        "daily life impact",
        &["daily", "work", "sleep", "routine", "family", "job", "exercise", "walk", "social"],
    );
    m
});

/// Keyword-heuristic sentiment and topic classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconBackend;

impl LexiconBackend {
    pub fn new() -> Self {
        Self
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
}

impl SentimentBackend for LexiconBackend {
    fn classify_sentiment(&self, text: &str) -> Result<SentimentResult> {
        let lowered = text.to_lowercase();
        let mut positive = 0usize;
        let mut negative = 0usize;
        for word in tokens(&lowered) {
            if POSITIVE_WORDS.contains(&word) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&word) {
                negative += 1;
            }
        }

        let hits = (positive + negative) as f64;
        let result = if positive == negative {
            if positive == 0 {
                SentimentResult::new(SentimentLabel::Neutral, NO_EVIDENCE_CONFIDENCE)
            } else {
                SentimentResult::new(SentimentLabel::Neutral, hits / (hits + 1.0))
            }
        } else {
            let margin = positive.abs_diff(negative) as f64;
            let label = if positive > negative {
                SentimentLabel::Positive
            } else {
                SentimentLabel::Negative
            };
            SentimentResult::new(label, 0.5 + 0.5 * margin / (hits + 1.0))
        };
        Ok(result)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

impl TopicBackend for LexiconBackend {
    /// Each cue found halves the remaining distance to 1.0; candidates
    /// without cues score 0.0. Results are ordered by descending score.
    fn classify_topics(&self, text: &str, candidates: &[&str]) -> Result<TopicResult> {
        let lowered = text.to_lowercase();
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|candidate| {
                let hits = TOPIC_CUES
                    .get(*candidate)
                    .map(|cues| cues.iter().filter(|cue| lowered.contains(*cue)).count())
                    .unwrap_or(0);
                let score = 1.0 - 0.5f64.powi(hits as i32);
                (candidate.to_string(), score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (labels, scores) = scored.into_iter().unzip();
        Ok(TopicResult { labels, scores })
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
