//! Inference result types and their fallback sentinels.

use journeylens_core::taxonomy::TOPICS;
use journeylens_core::Error;
use serde::{Deserialize, Serialize};

/// Sentiment score reported when no real inference result exists.
pub const FALLBACK_SENTIMENT_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" | "POS" => Ok(Self::Positive),
            "NEGATIVE" | "NEG" => Ok(Self::Negative),
            "NEUTRAL" | "NEU" => Ok(Self::Neutral),
            other => Err(Error::Inference(format!("unexpected sentiment label: {}", other))),
        }
    }
}

/// Sentiment label with confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentResult {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self { label, score }
    }

    /// `{NEUTRAL, 0.5}`.
    pub fn fallback() -> Self {
        Self::new(SentimentLabel::Neutral, FALLBACK_SENTIMENT_SCORE)
    }

    /// Consumers identify fallback entries by the sentinel score alone.
    pub fn is_fallback(&self) -> bool {
        self.score == FALLBACK_SENTIMENT_SCORE
    }
}

/// Multi-label topic scores; `labels` and `scores` are parallel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicResult {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl TopicResult {
    /// Every vocabulary topic at 0.0.
    pub fn fallback() -> Self {
        Self {
            labels: TOPICS.iter().map(|t| t.to_string()).collect(),
            scores: vec![0.0; TOPICS.len()],
        }
    }

    /// All-zero scores mark a fallback entry.
    pub fn is_fallback(&self) -> bool {
        self.scores.iter().all(|s| *s == 0.0)
    }

    pub fn score_for(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|i| self.scores.get(i).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.scores.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_sentinels() {
        let s = SentimentResult::fallback();
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert!(s.is_fallback());
        assert!(!SentimentResult::new(SentimentLabel::Positive, 0.93).is_fallback());

        let t = TopicResult::fallback();
        assert_eq!(t.labels.len(), 8);
        assert_eq!(t.labels.len(), t.scores.len());
        assert!(t.is_fallback());
        assert_eq!(t.score_for("side effects"), Some(0.0));
    }

    #[test]
    fn test_sentiment_label_serde() {
        let json = serde_json::to_value(SentimentResult::fallback()).unwrap();
        assert_eq!(json["label"], "NEUTRAL");
        assert_eq!(json["score"], 0.5);
        assert_eq!("positive".parse::<SentimentLabel>().unwrap(), SentimentLabel::Positive);
        assert!("LABEL_1".parse::<SentimentLabel>().is_err());
    }
}
