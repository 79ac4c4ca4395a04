//! Post-processing applied to sentiment results after inference.

use journeylens_infer::SentimentResult;
use serde::Serialize;

/// Scores above this are considered confident enough to amplify.
pub const AMPLIFY_THRESHOLD: f64 = 0.6;

/// Amplified scores are raised to at least this value.
pub const AMPLIFY_FLOOR: f64 = 0.9;

/// Sharpens confident predictions: a score above `threshold` is raised to
/// `max(score, floor)`. The label is never changed.
///
/// This alters the model's output, so it is a separate stage that can be
/// switched off and is recorded in run metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceAmplifier {
    pub enabled: bool,
    pub threshold: f64,
    pub floor: f64,
}

impl ConfidenceAmplifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            threshold: AMPLIFY_THRESHOLD,
            floor: AMPLIFY_FLOOR,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn apply(&self, result: SentimentResult) -> SentimentResult {
        if self.enabled && result.score > self.threshold {
            SentimentResult::new(result.label, result.score.max(self.floor))
        } else {
            result
        }
    }
}

impl Default for ConfidenceAmplifier {
    fn default() -> Self {
        Self::new(true)
    }
}
