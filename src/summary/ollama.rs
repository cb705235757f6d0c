use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::Summarizer;
use crate::llm::{generate_json_response, parse_json_object, LlmParams};
use crate::TARGET_LLM_REQUEST;

/// Abstractive summarizer backed by an Ollama-served LLM.
pub struct OllamaSummarizer {
    params: LlmParams,
}

impl OllamaSummarizer {
    pub fn new(params: LlmParams) -> Self {
        Self { params }
    }
}

fn summary_prompt(text: &str) -> String {
    format!(
        r#"
NEWS TEXT (TO BE SUMMARIZED):
----------
{text}
----------

IMPORTANT INSTRUCTIONS:
- **Summarize ONLY the text above.**
- Write 1 to 3 plain sentences in the same language as the text.
- Keep names, numbers and dates exactly as written.
- Do not add opinions or information that is not in the text.

RETURN FORMAT (JSON):
{{"summary": "..."}}
"#
    )
}

/// Pull the summary out of a `{"summary": ...}` reply.
pub(crate) fn parse_summary_response(response: &str) -> Result<String> {
    let json = parse_json_object(response)?;
    json.get("summary")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| anyhow::anyhow!("No 'summary' field in summarizer response"))
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    fn name(&self) -> &str {
        &self.params.model
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let response = generate_json_response(&summary_prompt(text), &self.params)
            .await
            .ok_or_else(|| anyhow::anyhow!("Summarization failed: No response from LLM"))?;
        let summary = parse_summary_response(&response)?;
        debug!(target: TARGET_LLM_REQUEST, "Generated summary of {} characters", summary.len());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_response() {
        assert_eq!(
            parse_summary_response(r#"{"summary": " Harga beras naik 10%. "}"#).unwrap(),
            "Harga beras naik 10%."
        );
        assert!(parse_summary_response(r#"{"text": "x"}"#).is_err());
        assert!(parse_summary_response("tidak tahu").is_err());
    }
}
