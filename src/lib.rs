pub mod aggregate;
pub mod article;
pub mod entity;
pub mod environment;
pub mod llm;
pub mod logging;
pub mod news;
pub mod relation;
pub mod sentiment;
pub mod summary;
pub mod text;
pub mod topic;

use std::sync::Arc;

pub use aggregate::{AnalysisEngine, AnalysisReport, RunOutcome, RunState};
pub use article::{Article, RawArticle};

pub const TARGET_ENGINE: &str = "engine";
pub const TARGET_MODEL: &str = "model";
pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_ENTITY: &str = "entity";
pub const TARGET_TOPIC: &str = "topic";

/// Outcome of a single analyzer call.
///
/// Analyzers never abort a batch. A call that failed still yields a value
/// (the fallback chosen by the engine) together with the reason it degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis<T> {
    Complete(T),
    Degraded { value: T, reason: String },
}

impl<T> Analysis<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Analysis::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Analysis::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Analysis::Complete(_) => None,
            Analysis::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Analysis::Complete(value) => value,
            Analysis::Degraded { value, .. } => value,
        }
    }
}

/// The long-lived model handles shared by every batch run.
///
/// Built once at process start and never mutated afterwards.
#[derive(Clone)]
pub struct ModelSet {
    pub sentiment: Arc<dyn sentiment::SentimentModel>,
    pub tagger: Arc<dyn entity::EntityTagger>,
    pub topics: Arc<dyn topic::TopicModel>,
    pub summarizer: Arc<dyn summary::Summarizer>,
}

impl ModelSet {
    pub fn new(
        sentiment: Arc<dyn sentiment::SentimentModel>,
        tagger: Arc<dyn entity::EntityTagger>,
        topics: Arc<dyn topic::TopicModel>,
    ) -> Self {
        Self {
            sentiment,
            tagger,
            topics,
            summarizer: Arc::new(summary::LeadSummarizer::default()),
        }
    }

    /// Replace the default lead-sentence summarizer.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn summary::Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Offline backends that need no external service.
    pub fn offline() -> Self {
        Self::new(
            Arc::new(sentiment::LexiconSentimentModel::new()),
            Arc::new(entity::CapitalizedEntityTagger::new()),
            Arc::new(topic::KeywordTopicModel::default()),
        )
    }
}

impl std::fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSet")
            .field("sentiment", &self.sentiment.name())
            .field("tagger", &self.tagger.name())
            .field("topics", &self.topics.name())
            .field("summarizer", &self.summarizer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_targets_are_distinct() {
        let targets = [
            TARGET_ENGINE,
            TARGET_MODEL,
            TARGET_WEB_REQUEST,
            TARGET_LLM_REQUEST,
            TARGET_ENTITY,
            TARGET_TOPIC,
        ];
        let unique: std::collections::HashSet<&str> = targets.iter().copied().collect();
        assert_eq!(unique.len(), targets.len());
    }

    #[test]
    fn test_analysis_value_survives_degradation() {
        let complete = Analysis::Complete(3);
        assert!(!complete.is_degraded());
        assert_eq!(complete.reason(), None);
        assert_eq!(complete.into_value(), 3);

        let degraded = Analysis::degraded(0, "model timed out");
        assert!(degraded.is_degraded());
        assert_eq!(degraded.reason(), Some("model timed out"));
        assert_eq!(degraded.into_value(), 0);
    }
}
