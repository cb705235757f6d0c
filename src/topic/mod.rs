//! Batch-level topic modeling.
//!
//! A [`TopicModel`] sees the whole batch at once. [`model_topics`] wraps it
//! with the batch-size check, a timeout and validation of the model output,
//! so a failed or undersized run still yields one assignment per document.

pub mod keyword;
pub mod vectorizer;

pub use keyword::KeywordTopicModel;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

use crate::{Analysis, TARGET_TOPIC};

/// Topic id reserved for documents without a coherent topic.
pub const OUTLIER_TOPIC_ID: i32 = -1;

pub const OUTLIER_TOPIC_NAME: &str = "Other";
pub const NO_TOPIC_NAME: &str = "No Topic";
pub const FAILED_TOPIC_NAME: &str = "Topic Detection Failed";

/// Fewest documents a topic model is asked to handle.
pub const MIN_TOPIC_DOCUMENTS: usize = 2;

/// One row of the topic table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicInfo {
    pub id: i32,
    pub name: String,
    pub count: usize,
}

/// Ranked keywords for one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicKeywords {
    pub topic: i32,
    pub keywords: Vec<String>,
}

/// Raw output of a topic model over one batch.
#[derive(Debug, Clone, Default)]
pub struct TopicFit {
    /// Topic id per input document, in input order.
    pub assignments: Vec<i32>,
    pub topics: Vec<TopicInfo>,
    /// Ranked keywords per topic id, best first.
    pub keywords: HashMap<i32, Vec<String>>,
}

/// An unsupervised topic model over a batch of clean texts.
#[async_trait]
pub trait TopicModel: Send + Sync {
    fn name(&self) -> &str;

    async fn fit_transform(&self, docs: &[String]) -> Result<TopicFit>;
}

/// Validated topic assignment for a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopicOutcome {
    pub assignments: Vec<i32>,
    /// Display name per document, parallel to `assignments`.
    pub names: Vec<String>,
    /// Topic table without the outlier row, largest topic first.
    pub topics: Vec<TopicInfo>,
    pub keywords: Vec<TopicKeywords>,
}

impl TopicOutcome {
    /// Every document in the outlier topic, with empty tables.
    pub fn fallback(doc_count: usize, name: &str) -> Self {
        Self {
            assignments: vec![OUTLIER_TOPIC_ID; doc_count],
            names: vec![name.to_string(); doc_count],
            topics: Vec::new(),
            keywords: Vec::new(),
        }
    }

    fn from_fit(fit: TopicFit, keyword_count: usize) -> Result<Self> {
        let TopicFit {
            assignments,
            topics,
            mut keywords,
        } = fit;

        let mut names = Vec::with_capacity(assignments.len());
        for &topic_id in &assignments {
            if topic_id == OUTLIER_TOPIC_ID {
                names.push(OUTLIER_TOPIC_NAME.to_string());
                continue;
            }
            let topic = topics
                .iter()
                .find(|t| t.id == topic_id)
                .ok_or_else(|| anyhow::anyhow!("Assignment to unknown topic {}", topic_id))?;
            names.push(topic.name.clone());
        }

        // Counts are taken from the assignments so the table always agrees with them
        let mut table: Vec<TopicInfo> = topics
            .into_iter()
            .filter(|t| t.id != OUTLIER_TOPIC_ID)
            .map(|t| TopicInfo {
                count: assignments.iter().filter(|&&a| a == t.id).count(),
                ..t
            })
            .collect();
        table.sort_by(|a, b| b.count.cmp(&a.count).then(a.id.cmp(&b.id)));

        let keywords = table
            .iter()
            .map(|t| {
                let mut words = keywords.remove(&t.id).unwrap_or_default();
                words.truncate(keyword_count);
                TopicKeywords {
                    topic: t.id,
                    keywords: words,
                }
            })
            .collect();

        Ok(Self {
            assignments,
            names,
            topics: table,
            keywords,
        })
    }
}

/// Run the topic model once over the whole batch.
///
/// Batches smaller than [`MIN_TOPIC_DOCUMENTS`] are not modeled. Model errors,
/// timeouts and assignments that do not line up with the input degrade to the
/// outlier topic for every document.
pub async fn model_topics(
    model: &dyn TopicModel,
    docs: &[String],
    limit: Duration,
    keyword_count: usize,
) -> Analysis<TopicOutcome> {
    if docs.len() < MIN_TOPIC_DOCUMENTS {
        warn!(
            target: TARGET_TOPIC,
            "Not enough documents for topic modeling: {} (need {})",
            docs.len(),
            MIN_TOPIC_DOCUMENTS
        );
        return Analysis::degraded(
            TopicOutcome::fallback(docs.len(), NO_TOPIC_NAME),
            format!(
                "topic modeling needs at least {} documents, got {}",
                MIN_TOPIC_DOCUMENTS,
                docs.len()
            ),
        );
    }

    let fit = match timeout(limit, model.fit_transform(docs)).await {
        Ok(Ok(fit)) => fit,
        Ok(Err(e)) => {
            warn!(target: TARGET_TOPIC, "Topic model {} failed: {}", model.name(), e);
            return Analysis::degraded(
                TopicOutcome::fallback(docs.len(), FAILED_TOPIC_NAME),
                format!("topic modeling failed: {}", e),
            );
        }
        Err(_) => {
            warn!(target: TARGET_TOPIC, "Topic model {} timed out after {:?}", model.name(), limit);
            return Analysis::degraded(
                TopicOutcome::fallback(docs.len(), FAILED_TOPIC_NAME),
                format!("topic modeling timed out after {:?}", limit),
            );
        }
    };

    if fit.assignments.len() != docs.len() {
        warn!(
            target: TARGET_TOPIC,
            "Topic model {} returned {} assignments for {} documents",
            model.name(),
            fit.assignments.len(),
            docs.len()
        );
        return Analysis::degraded(
            TopicOutcome::fallback(docs.len(), FAILED_TOPIC_NAME),
            format!(
                "topic model returned {} assignments for {} documents",
                fit.assignments.len(),
                docs.len()
            ),
        );
    }

    match TopicOutcome::from_fit(fit, keyword_count) {
        Ok(outcome) => {
            info!(
                target: TARGET_TOPIC,
                "Found {} topics across {} documents",
                outcome.topics.len(),
                docs.len()
            );
            Analysis::Complete(outcome)
        }
        Err(e) => {
            warn!(target: TARGET_TOPIC, "Topic model {} returned malformed output: {}", model.name(), e);
            Analysis::degraded(
                TopicOutcome::fallback(docs.len(), FAILED_TOPIC_NAME),
                format!("malformed topic output: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel(TopicFit);

    #[async_trait]
    impl TopicModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fit_transform(&self, _docs: &[String]) -> Result<TopicFit> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl TopicModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fit_transform(&self, _docs: &[String]) -> Result<TopicFit> {
            Err(anyhow::anyhow!("embedding backend unavailable"))
        }
    }

    fn docs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("dokumen nomor {}", i)).collect()
    }

    fn limit() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test]
    async fn test_single_document_is_outlier_with_empty_table() {
        let result = model_topics(&KeywordTopicModel::default(), &docs(1), limit(), 5).await;
        assert!(result.is_degraded());
        let outcome = result.into_value();
        assert_eq!(outcome.assignments, vec![OUTLIER_TOPIC_ID]);
        assert_eq!(outcome.names, vec![NO_TOPIC_NAME.to_string()]);
        assert!(outcome.topics.is_empty());
        assert!(outcome.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_degrades_every_document() {
        let result = model_topics(&FailingModel, &docs(3), limit(), 5).await;
        assert!(result.reason().unwrap().contains("embedding backend unavailable"));
        let outcome = result.into_value();
        assert_eq!(outcome, TopicOutcome::fallback(3, FAILED_TOPIC_NAME));
    }

    #[tokio::test]
    async fn test_mismatched_or_unknown_assignments_degrade() {
        let short = FixedModel(TopicFit {
            assignments: vec![0],
            ..Default::default()
        });
        assert!(model_topics(&short, &docs(2), limit(), 5).await.is_degraded());

        let unknown = FixedModel(TopicFit {
            assignments: vec![7, OUTLIER_TOPIC_ID],
            ..Default::default()
        });
        let result = model_topics(&unknown, &docs(2), limit(), 5).await;
        assert!(result.is_degraded());
        assert_eq!(result.into_value().names[0], FAILED_TOPIC_NAME);
    }

    #[tokio::test]
    async fn test_outcome_drops_outlier_row_and_truncates_keywords() {
        let mut keywords: HashMap<i32, Vec<String>> = HashMap::new();
        keywords.insert(0, vec!["a", "b", "c", "d"].into_iter().map(String::from).collect());
        keywords.insert(OUTLIER_TOPIC_ID, vec!["noise".to_string()]);
        let model = FixedModel(TopicFit {
            assignments: vec![0, OUTLIER_TOPIC_ID, 0],
            topics: vec![
                TopicInfo {
                    id: OUTLIER_TOPIC_ID,
                    name: "-1_noise".to_string(),
                    count: 1,
                },
                TopicInfo {
                    id: 0,
                    name: "0_a_b_c".to_string(),
                    count: 99,
                },
            ],
            keywords,
        });

        let result = model_topics(&model, &docs(3), limit(), 2).await;
        assert!(!result.is_degraded());
        let outcome = result.into_value();
        assert_eq!(outcome.names, vec!["0_a_b_c", OUTLIER_TOPIC_NAME, "0_a_b_c"]);
        assert_eq!(
            outcome.topics,
            vec![TopicInfo {
                id: 0,
                name: "0_a_b_c".to_string(),
                count: 2
            }]
        );
        assert_eq!(outcome.keywords[0].keywords, vec!["a", "b"]);
    }
}
