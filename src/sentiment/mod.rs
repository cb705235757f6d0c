//! Sentiment scoring.
//!
//! Wraps a sentiment classifier and maps its categorical output to the signed
//! score every downstream statistic is built from: `+confidence` for
//! positive, `-confidence` for negative and exactly `0` for neutral.

mod lexicon;
mod ollama;

pub use self::lexicon::LexiconSentimentModel;
pub use self::ollama::OllamaSentimentModel;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::{Analysis, TARGET_MODEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = anyhow::Error;

    /// Accepts the English and Indonesian names classifiers emit.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "positif" | "pos" => Ok(SentimentLabel::Positive),
            "neutral" | "netral" | "neu" => Ok(SentimentLabel::Neutral),
            "negative" | "negatif" | "neg" => Ok(SentimentLabel::Negative),
            other => Err(anyhow::anyhow!("Unknown sentiment label: {}", other)),
        }
    }
}

/// Categorical sentiment label with the classifier's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl SentimentResult {
    /// Confidence is clamped into `[0, 1]`; NaN becomes 0.
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { label, confidence }
    }

    pub fn neutral() -> Self {
        Self::new(SentimentLabel::Neutral, 0.0)
    }

    /// Score in `[-1, 1]`: sign from the label, magnitude from the confidence.
    pub fn signed_score(&self) -> f64 {
        match self.label {
            SentimentLabel::Positive => self.confidence,
            SentimentLabel::Negative => -self.confidence,
            SentimentLabel::Neutral => 0.0,
        }
    }
}

#[async_trait]
pub trait SentimentModel: Send + Sync {
    fn name(&self) -> &str;

    /// Classify one non-empty clean text.
    async fn classify(&self, text: &str) -> Result<SentimentResult>;
}

/// Score one clean text, never failing.
///
/// Empty input yields a neutral result without calling the model. Model
/// errors and timeouts yield a degraded neutral result.
pub async fn score_sentiment(
    model: &dyn SentimentModel,
    text: &str,
    limit: Duration,
) -> Analysis<SentimentResult> {
    if text.trim().is_empty() {
        debug!(target: TARGET_MODEL, "Empty text, scoring as neutral");
        return Analysis::Complete(SentimentResult::neutral());
    }

    match timeout(limit, model.classify(text)).await {
        Ok(Ok(result)) => Analysis::Complete(result),
        Ok(Err(e)) => {
            warn!(target: TARGET_MODEL, "Sentiment model {} failed: {}", model.name(), e);
            Analysis::degraded(
                SentimentResult::neutral(),
                format!("sentiment model failed: {}", e),
            )
        }
        Err(_) => {
            warn!(target: TARGET_MODEL, "Sentiment model {} timed out after {:?}", model.name(), limit);
            Analysis::degraded(
                SentimentResult::neutral(),
                format!("sentiment model timed out after {:?}", limit),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingModel;

    #[async_trait]
    impl SentimentModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn classify(&self, _text: &str) -> Result<SentimentResult> {
            Err(anyhow::anyhow!("CUDA out of memory"))
        }
    }

    struct SlowModel;

    #[async_trait]
    impl SentimentModel for SlowModel {
        fn name(&self) -> &str {
            "slow"
        }

        async fn classify(&self, _text: &str) -> Result<SentimentResult> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(SentimentResult::new(SentimentLabel::Positive, 0.9))
        }
    }

    #[test]
    fn test_signed_score_bounds_and_sign() {
        for label in SentimentLabel::ALL {
            for confidence in [-0.5, 0.0, 0.25, 0.8, 1.0, 3.0, f64::NAN] {
                let result = SentimentResult::new(label, confidence);
                let score = result.signed_score();
                assert!((-1.0..=1.0).contains(&score));
                match label {
                    SentimentLabel::Positive => {
                        assert!(score >= 0.0);
                        assert_eq!(score, result.confidence);
                    }
                    SentimentLabel::Negative => {
                        assert!(score <= 0.0);
                        assert_eq!(-score, result.confidence);
                    }
                    SentimentLabel::Neutral => assert_eq!(score, 0.0),
                }
            }
        }
    }

    #[test]
    fn test_label_aliases() {
        assert_eq!("Positif".parse::<SentimentLabel>().unwrap(), SentimentLabel::Positive);
        assert_eq!("NEGATIVE".parse::<SentimentLabel>().unwrap(), SentimentLabel::Negative);
        assert_eq!(" netral ".parse::<SentimentLabel>().unwrap(), SentimentLabel::Neutral);
        assert!("mixed".parse::<SentimentLabel>().is_err());
    }

    #[tokio::test]
    async fn test_empty_text_is_neutral_without_model_call() {
        let result = score_sentiment(&FailingModel, "   ", Duration::from_secs(1)).await;
        assert_eq!(result, Analysis::Complete(SentimentResult::neutral()));
    }

    #[tokio::test]
    async fn test_model_error_degrades_to_neutral() {
        let result = score_sentiment(&FailingModel, "Harga naik", Duration::from_secs(1)).await;
        assert!(result.is_degraded());
        assert!(result.reason().unwrap().contains("CUDA"));
        assert_eq!(result.into_value().signed_score(), 0.0);
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_neutral() {
        let result = score_sentiment(&SlowModel, "Harga naik", Duration::from_millis(50)).await;
        assert!(result.is_degraded());
        assert!(result.reason().unwrap().contains("timed out"));
    }
}
