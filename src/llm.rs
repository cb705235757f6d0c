use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use ollama_rs::generation::parameters::FormatType;
use ollama_rs::Ollama;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::TARGET_LLM_REQUEST;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection and sampling settings shared by the Ollama-backed models.
#[derive(Clone, Debug)]
pub struct LlmParams {
    pub ollama: Ollama,
    pub model: String,
    pub temperature: f32,
}

impl LlmParams {
    pub fn new(host: &str, port: u16, model: &str, temperature: f32) -> Self {
        info!(target: TARGET_LLM_REQUEST, "Using Ollama at {}:{} with model {}", host, port, model);
        Self {
            ollama: Ollama::new(host.to_string(), port),
            model: model.to_string(),
            temperature,
        }
    }
}

/// Ask the model for a JSON answer, retrying with exponential backoff.
///
/// Returns `None` when every attempt failed or timed out.
pub async fn generate_json_response(prompt: &str, params: &LlmParams) -> Option<String> {
    let mut response_text = String::new();
    let mut backoff = 2;

    for retry_count in 0..MAX_RETRIES {
        let mut request = GenerationRequest::new(params.model.clone(), prompt.to_string());
        request.options = Some(GenerationOptions::default().temperature(params.temperature));
        request.format = Some(FormatType::Json);

        debug!(target: TARGET_LLM_REQUEST, "Sending LLM request to {}", params.model);

        match timeout(REQUEST_TIMEOUT, params.ollama.generate(request)).await {
            Ok(Ok(response)) => {
                response_text = response.response;
                debug!(target: TARGET_LLM_REQUEST, "LLM response received: {}", response_text);
                break;
            }
            Ok(Err(e)) => {
                warn!(target: TARGET_LLM_REQUEST, "Error generating response: {}", e);
            }
            Err(_) => {
                warn!(target: TARGET_LLM_REQUEST, "LLM request timed out");
            }
        }

        if retry_count < MAX_RETRIES - 1 {
            info!(target: TARGET_LLM_REQUEST, "Retrying LLM request in {}s ({}/{})", backoff, retry_count + 1, MAX_RETRIES);
            sleep(Duration::from_secs(backoff)).await;
            backoff *= 2;
        }
    }

    if response_text.is_empty() {
        error!(target: TARGET_LLM_REQUEST, "No response generated after {} attempts", MAX_RETRIES);
        None
    } else {
        Some(response_text)
    }
}

/// Parse a model reply as a JSON object, tolerating prose around it.
pub fn parse_json_object(response: &str) -> anyhow::Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(response) {
        return Ok(value);
    }

    // Some models wrap the object in prose or code fences
    let start = response.find('{');
    let end = response.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&response[start..=end])
            .map_err(|e| {
                anyhow::anyhow!(
                    "Invalid JSON response: {}. Raw content: {}",
                    e,
                    response.chars().take(200).collect::<String>()
                )
            }),
        _ => Err(anyhow::anyhow!("No JSON object in response")),
    }
}
