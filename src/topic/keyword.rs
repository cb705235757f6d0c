use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use super::vectorizer::{cosine_similarity, TfIdfVectorizer};
use super::{TopicFit, TopicInfo, TopicModel, OUTLIER_TOPIC_ID};
use crate::text::{tokenize_words, StopWords};
use crate::TARGET_TOPIC;

// Ranked keywords kept per topic before the caller truncates them
const KEYWORDS_PER_TOPIC: usize = 10;

struct Cluster {
    members: Vec<usize>,
    centroid: Vec<f64>,
}

/// Offline topic model: TF-IDF vectors grouped by single-pass leader clustering.
///
/// Each document joins the most similar existing cluster when the cosine
/// similarity to its centroid reaches `similarity_threshold`, and starts a new
/// cluster otherwise. Clusters smaller than `min_topic_size` are outliers.
#[derive(Debug, Clone)]
pub struct KeywordTopicModel {
    similarity_threshold: f64,
    min_topic_size: usize,
    stopwords: StopWords,
}

impl Default for KeywordTopicModel {
    fn default() -> Self {
        Self::new(0.1, 2, StopWords::default())
    }
}

impl KeywordTopicModel {
    pub fn new(similarity_threshold: f64, min_topic_size: usize, stopwords: StopWords) -> Self {
        Self {
            similarity_threshold,
            min_topic_size: min_topic_size.max(1),
            stopwords,
        }
    }

    fn cluster(&self, matrix: &[Vec<f64>]) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = Vec::new();

        for (doc_idx, row) in matrix.iter().enumerate() {
            // Documents without any content words can never join a topic
            if row.iter().all(|v| *v == 0.0) {
                continue;
            }

            let best = clusters
                .iter()
                .enumerate()
                .filter_map(|(idx, cluster)| {
                    cosine_similarity(row, &cluster.centroid)
                        .ok()
                        .map(|similarity| (idx, similarity))
                })
                .max_by(|a, b| a.1.total_cmp(&b.1));

            match best {
                Some((idx, similarity)) if similarity >= self.similarity_threshold => {
                    let cluster = &mut clusters[idx];
                    cluster.members.push(doc_idx);
                    for (c, v) in cluster.centroid.iter_mut().zip(row) {
                        *c += v;
                    }
                }
                _ => clusters.push(Cluster {
                    members: vec![doc_idx],
                    centroid: row.clone(),
                }),
            }
        }

        clusters
    }
}

#[async_trait]
impl TopicModel for KeywordTopicModel {
    fn name(&self) -> &str {
        "keyword-tfidf"
    }

    async fn fit_transform(&self, docs: &[String]) -> Result<TopicFit> {
        let tokenized: Vec<Vec<String>> = docs
            .iter()
            .map(|doc| tokenize_words(doc, &self.stopwords))
            .collect();

        let mut vectorizer = TfIdfVectorizer::new();
        let matrix = vectorizer.fit_transform(&tokenized);
        debug!(
            target: TARGET_TOPIC,
            "Vectorized {} documents over {} terms",
            docs.len(),
            vectorizer.vocabulary_size()
        );

        let mut clusters: Vec<Cluster> = self
            .cluster(&matrix)
            .into_iter()
            .filter(|c| c.members.len() >= self.min_topic_size)
            .collect();
        // Largest topic first; ties keep the order in which clusters formed
        clusters.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then(a.members[0].cmp(&b.members[0]))
        });

        let mut assignments = vec![OUTLIER_TOPIC_ID; docs.len()];
        let mut topics = Vec::with_capacity(clusters.len());
        let mut keywords = HashMap::new();

        for (topic_idx, cluster) in clusters.iter().enumerate() {
            let topic_id = topic_idx as i32;
            for &member in &cluster.members {
                assignments[member] = topic_id;
            }

            // The centroid is the summed TF-IDF of the members
            let mut ranked: Vec<(usize, f64)> = cluster
                .centroid
                .iter()
                .copied()
                .enumerate()
                .filter(|(_, weight)| *weight > 0.0)
                .collect();
            ranked.sort_by(|a, b| {
                b.1.total_cmp(&a.1)
                    .then_with(|| vectorizer.term(a.0).cmp(&vectorizer.term(b.0)))
            });
            let words: Vec<String> = ranked
                .into_iter()
                .take(KEYWORDS_PER_TOPIC)
                .filter_map(|(idx, _)| vectorizer.term(idx).map(String::from))
                .collect();

            let mut name = topic_id.to_string();
            for word in words.iter().take(4) {
                name.push('_');
                name.push_str(word);
            }

            topics.push(TopicInfo {
                id: topic_id,
                name,
                count: cluster.members.len(),
            });
            keywords.insert(topic_id, words);
        }

        Ok(TopicFit {
            assignments,
            topics,
            keywords,
        })
    }
}
