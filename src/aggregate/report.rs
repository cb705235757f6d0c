use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::corpus::WordCount;
use super::matrix::EntityStat;
use super::sentiment::{CompositionRow, TrendPoint};
use crate::relation::{EntityGraph, RelationRow};
use crate::topic::{TopicInfo, TopicKeywords};

/// Pipeline stage a soft warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Sentiment,
    Entities,
    Summary,
    Topics,
    Trend,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Sentiment => write!(f, "sentiment"),
            Stage::Entities => write!(f, "entities"),
            Stage::Summary => write!(f, "summary"),
            Stage::Topics => write!(f, "topics"),
            Stage::Trend => write!(f, "trend"),
        }
    }
}

/// A recoverable problem the run worked around.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub stage: Stage,
    /// Article the warning is about; `None` for batch-level stages.
    pub url: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(stage: Stage, url: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            stage,
            url: url.map(String::from),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "[{}] {}: {}", self.stage, url, self.message),
            None => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicAssignment {
    pub url: String,
    pub topic_id: i32,
    pub topic_name: String,
}

/// Everything the presentation layer needs from one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub article_count: usize,
    pub composition: Vec<CompositionRow>,
    pub trend: Vec<TrendPoint>,
    pub events: Vec<NaiveDate>,
    pub entity_matrix: Vec<EntityStat>,
    pub topics: Vec<TopicInfo>,
    pub topic_keywords: Vec<TopicKeywords>,
    pub topic_assignments: Vec<TopicAssignment>,
    pub word_corpus: Vec<WordCount>,
    pub relation_counts: Vec<RelationRow>,
    pub entity_graph: EntityGraph,
    pub warnings: Vec<Warning>,
}

impl AnalysisReport {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let article = Warning::new(Stage::Sentiment, Some("https://example.com/a"), "timed out");
        assert_eq!(article.to_string(), "[sentiment] https://example.com/a: timed out");
        let batch = Warning::new(Stage::Topics, None, "not enough documents");
        assert_eq!(batch.to_string(), "[topics] not enough documents");
    }

    #[test]
    fn test_warning_serializes_stage_lowercase() {
        let json = serde_json::to_value(Warning::new(Stage::Entities, None, "x")).unwrap();
        assert_eq!(json["stage"], "entities");
        assert!(json["url"].is_null());
    }
}
