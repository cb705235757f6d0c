//! Per-article summaries.
//!
//! A [`Summarizer`] condenses one clean text. [`summarize_text`] adds the
//! timeout and turns every failure into a degraded result that carries a
//! fixed placeholder, so each analyzed article ends up with some summary.

mod lead;
mod ollama;

pub use self::lead::LeadSummarizer;
pub use self::ollama::OllamaSummarizer;

use anyhow::Result;
use async_trait::async_trait;
use tokio::time::{timeout, Duration};
use tracing::warn;

use crate::{Analysis, TARGET_MODEL};

/// Shown in place of a summary the model could not produce.
pub const SUMMARY_UNAVAILABLE: &str =
    "No summary available for this article (text too short or model problem).";

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize one non-empty clean text.
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Summarize one clean text, never failing.
///
/// Empty input, model errors, timeouts and blank model output all yield a
/// degraded [`SUMMARY_UNAVAILABLE`].
pub async fn summarize_text(model: &dyn Summarizer, text: &str, limit: Duration) -> Analysis<String> {
    if text.trim().is_empty() {
        return Analysis::degraded(SUMMARY_UNAVAILABLE.to_string(), "no text to summarize");
    }

    match timeout(limit, model.summarize(text)).await {
        Ok(Ok(summary)) => {
            let summary = summary.trim();
            if summary.is_empty() {
                warn!(target: TARGET_MODEL, "Summarizer {} returned an empty summary", model.name());
                Analysis::degraded(SUMMARY_UNAVAILABLE.to_string(), "summarizer returned no text")
            } else {
                Analysis::Complete(summary.to_string())
            }
        }
        Ok(Err(e)) => {
            warn!(target: TARGET_MODEL, "Summarizer {} failed: {}", model.name(), e);
            Analysis::degraded(
                SUMMARY_UNAVAILABLE.to_string(),
                format!("summarizer failed: {}", e),
            )
        }
        Err(_) => {
            warn!(target: TARGET_MODEL, "Summarizer {} timed out after {:?}", model.name(), limit);
            Analysis::degraded(
                SUMMARY_UNAVAILABLE.to_string(),
                format!("summarizer timed out after {:?}", limit),
            )
        }
    }
}
