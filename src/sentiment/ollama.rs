use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{SentimentLabel, SentimentModel, SentimentResult};
use crate::llm::{generate_json_response, parse_json_object, LlmParams};
use crate::TARGET_LLM_REQUEST;

/// Sentiment classifier backed by an Ollama-served LLM.
pub struct OllamaSentimentModel {
    params: LlmParams,
}

impl OllamaSentimentModel {
    pub fn new(params: LlmParams) -> Self {
        Self { params }
    }
}

fn sentiment_prompt(text: &str) -> String {
    format!(
        r#"Classify the overall sentiment of this news text.

TEXT:
----------
{text}
----------

Respond with JSON only:
{{"label": "positive|neutral|negative", "confidence": <number between 0 and 1>}}"#
    )
}

/// Turn a `{"label", "confidence"}` reply into a result.
pub(crate) fn parse_sentiment_response(response: &str) -> Result<SentimentResult> {
    let json = parse_json_object(response)?;
    let label: SentimentLabel = json
        .get("label")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("No 'label' field in sentiment response"))?
        .parse()?;
    // Labels without a confidence count as fully confident
    let confidence = json
        .get("confidence")
        .or_else(|| json.get("score"))
        .and_then(Value::as_f64)
        .unwrap_or(1.0);
    Ok(SentimentResult::new(label, confidence))
}

#[async_trait]
impl SentimentModel for OllamaSentimentModel {
    fn name(&self) -> &str {
        &self.params.model
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        let response = generate_json_response(&sentiment_prompt(text), &self.params)
            .await
            .ok_or_else(|| anyhow::anyhow!("Sentiment classification failed: No response from LLM"))?;
        let result = parse_sentiment_response(&response)?;
        debug!(target: TARGET_LLM_REQUEST, "Classified sentiment as {} ({:.2})", result.label, result.confidence);
        Ok(result)
    }
}
