//! Hosted transformer pipelines (Hugging Face inference API) over HTTP.
//!
//! Sentiment uses a text-classification model, topics a zero-shot
//! classification model in multi-label mode. Requests are blocking; callers
//! that want concurrency run them on worker threads.

use std::time::Duration;

use journeylens_core::{Error, InferenceConfig, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::backend::{SentimentBackend, TopicBackend};
use crate::types::{SentimentResult, TopicResult};

/// Remote sentiment + zero-shot topic backend.
pub struct HuggingFaceBackend {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    sentiment_model: String,
    topic_model: String,
}

impl HuggingFaceBackend {
    pub fn new(base_url: &str, config: &InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            sentiment_model: config.sentiment_model.clone(),
            topic_model: config.topic_model.clone(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    fn post(&self, model: &str, body: &Value) -> Result<Value> {
        let mut request = self.client.post(self.model_url(model)).json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| Error::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(Error::Inference(format!("{} returned {}: {}", model, status, text)));
        }

        response
            .json::<Value>()
            .map_err(|e| Error::Inference(format!("invalid response from {}: {}", model, e)))
    }
}

impl SentimentBackend for HuggingFaceBackend {
    fn classify_sentiment(&self, text: &str) -> Result<SentimentResult> {
        let body = json!({ "inputs": text });
        let value = self.post(&self.sentiment_model, &body)?;
        debug!("Sentiment response from {}", self.sentiment_model);
        parse_sentiment(&value)
    }

    fn name(&self) -> &str {
        &self.sentiment_model
    }
}

impl TopicBackend for HuggingFaceBackend {
    fn classify_topics(&self, text: &str, candidates: &[&str]) -> Result<TopicResult> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": candidates,
                "multi_label": true,
            },
        });
        let value = self.post(&self.topic_model, &body)?;
        debug!("Topic response from {}", self.topic_model);
        parse_topics(&value)
    }

    fn name(&self) -> &str {
        &self.topic_model
    }
}

/// Parse a text-classification response: `[[{label, score}, ..]]` or
/// `[{label, score}, ..]`. The highest-scoring entry wins.
pub fn parse_sentiment(value: &Value) -> Result<SentimentResult> {
    let entries: &[Value] = match value {
        Value::Array(outer) => match outer.first() {
            Some(Value::Array(inner)) => inner.as_slice(),
            _ => outer.as_slice(),
        },
        Value::Object(_) => std::slice::from_ref(value),
        _ => &[],
    };

    let mut best: Option<(&str, f64)> = None;
    for entry in entries {
        let label = entry.get("label").and_then(Value::as_str);
        let score = entry.get("score").and_then(Value::as_f64);
        if let (Some(label), Some(score)) = (label, score) {
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((label, score));
            }
        }
    }

    let (label, score) =
        best.ok_or_else(|| Error::Inference("sentiment response has no label/score".into()))?;
    Ok(SentimentResult::new(label.parse()?, score))
}

/// Parse a zero-shot response: `{labels: [..], scores: [..]}` or
/// `[{label, score}, ..]`.
pub fn parse_topics(value: &Value) -> Result<TopicResult> {
    if let Some(obj) = value.as_object() {
        let labels: Option<Vec<String>> = obj.get("labels").and_then(Value::as_array).map(|a| {
            a.iter()
                .filter_map(|l| l.as_str().map(str::to_string))
                .collect()
        });
        let scores: Option<Vec<f64>> = obj
            .get("scores")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_f64).collect());

        return match (labels, scores) {
            (Some(labels), Some(scores)) if labels.len() == scores.len() => {
                Ok(TopicResult { labels, scores })
            }
            _ => Err(Error::Inference("malformed zero-shot response".into())),
        };
    }

    if let Some(entries) = value.as_array() {
        let mut labels = Vec::with_capacity(entries.len());
        let mut scores = Vec::with_capacity(entries.len());
        for entry in entries {
            let label = entry.get("label").and_then(Value::as_str);
            let score = entry.get("score").and_then(Value::as_f64);
            match (label, score) {
                (Some(l), Some(s)) => {
                    labels.push(l.to_string());
                    scores.push(s);
                }
                _ => return Err(Error::Inference("malformed zero-shot entry".into())),
            }
        }
        return Ok(TopicResult { labels, scores });
    }

    Err(Error::Inference("unexpected zero-shot response shape".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;

    #[test]
    fn test_parse_nested_sentiment() {
        let value = json!([[
            {"label": "NEGATIVE", "score": 0.12},
            {"label": "POSITIVE", "score": 0.88}
        ]]);
        let result = parse_sentiment(&value).unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!((result.score - 0.88).abs() < 1e-9);
    }

    #[test]
    fn test_parse_flat_sentiment() {
        let value = json!([{"label": "NEGATIVE", "score": 0.97}]);
        let result = parse_sentiment(&value).unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_parse_sentiment_errors() {
        assert!(parse_sentiment(&json!([])).is_err());
        assert!(parse_sentiment(&json!({"error": "Model is loading"})).is_err());
        assert!(parse_sentiment(&json!([{"label": "LABEL_1", "score": 0.9}])).is_err());
    }

    #[test]
    fn test_parse_zero_shot_object() {
        let value = json!({
            "sequence": "Doctor prescribed new medication",
            "labels": ["medication", "doctor visits"],
            "scores": [0.91, 0.64]
        });
        let result = parse_topics(&value).unwrap();
        assert_eq!(result.labels, vec!["medication", "doctor visits"]);
        assert_eq!(result.score_for("doctor visits"), Some(0.64));
    }

    #[test]
    fn test_parse_zero_shot_list() {
        let value = json!([{"label": "symptoms", "score": 0.8}, {"label": "diagnosis", "score": 0.1}]);
        let result = parse_topics(&value).unwrap();
        assert_eq!(result.labels.len(), 2);
        assert_eq!(result.scores, vec![0.8, 0.1]);
    }

    #[test]
    fn test_parse_zero_shot_mismatch() {
        let value = json!({"labels": ["a", "b"], "scores": [0.5]});
        assert!(parse_topics(&value).is_err());
        assert!(parse_topics(&json!("oops")).is_err());
    }

    #[test]
    fn test_model_url() {
        let config = InferenceConfig::default();
        let backend = HuggingFaceBackend::new("http://localhost:8080/", &config).unwrap();
        assert_eq!(
            backend.model_url("facebook/bart-large-mnli"),
            "http://localhost:8080/models/facebook/bart-large-mnli"
        );
    }
}
