//! Sentence-level co-occurrence between entities.
//!
//! Counting is a pure reduction: every article yields its own pair counts,
//! the partial maps are merged in article order, and the graph is derived
//! from the finished counts in a single step.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::article::Article;
use crate::entity::{group_by_sentence, Entity};
use crate::environment::SentenceMatching;
use crate::TARGET_ENGINE;

/// Co-occurrence counts keyed by the lexicographically sorted entity pair.
pub type PairCounts = BTreeMap<(String, String), u32>;

/// Order-independent key for a pair of entity surfaces.
pub fn canonical_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Pair counts for one article: each sentence adds one to every pair of
/// distinct qualifying entities it contains.
pub fn count_article_pairs(
    clean_text: &str,
    entities: &[Entity],
    mode: SentenceMatching,
) -> PairCounts {
    let mut counts = PairCounts::new();
    for group in group_by_sentence(clean_text, entities, mode) {
        let surfaces = group.qualifying_surfaces();
        for (i, first) in surfaces.iter().enumerate() {
            for second in &surfaces[i + 1..] {
                *counts.entry(canonical_pair(first, second)).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Add `partial` into `total`.
pub fn merge_counts(total: &mut PairCounts, partial: PairCounts) {
    for (pair, count) in partial {
        *total.entry(pair).or_insert(0) += count;
    }
}

/// Pair counts across a whole batch of analyzed articles.
pub fn count_pairs(articles: &[Article], mode: SentenceMatching) -> PairCounts {
    let mut total = PairCounts::new();
    for article in articles {
        merge_counts(
            &mut total,
            count_article_pairs(&article.clean_text, &article.entities, mode),
        );
    }
    debug!(
        target: TARGET_ENGINE,
        "Counted {} distinct entity pairs across {} articles",
        total.len(),
        articles.len()
    );
    total
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Undirected weighted co-occurrence graph.
///
/// Serializes as `{"nodes": [..], "edges": [..]}` with nodes sorted and each
/// edge written `source < target`.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    graph: UnGraph<String, u32>,
    node_map: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    /// Every entity that co-occurred with another at least once, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Edges in pair order.
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .map(|edge| GraphEdge {
                source: self.graph[edge.source()].clone(),
                target: self.graph[edge.target()].clone(),
                weight: *edge.weight(),
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let a = *self.node_map.get(a)?;
        let b = *self.node_map.get(b)?;
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.weight(a, b).is_some()
    }
}

impl PartialEq for EntityGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes() == other.nodes() && self.edges() == other.edges()
    }
}

#[derive(Serialize)]
struct GraphView<'a> {
    nodes: Vec<&'a str>,
    edges: Vec<GraphEdge>,
}

impl Serialize for EntityGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GraphView {
            nodes: self.nodes(),
            edges: self.edges(),
        }
        .serialize(serializer)
    }
}

/// Materialize the graph: a node per entity seen in any pair, an edge per pair
/// whose count is strictly above `threshold`.
pub fn build_graph(counts: &PairCounts, threshold: u32) -> EntityGraph {
    let names: BTreeSet<&String> = counts.keys().flat_map(|(a, b)| [a, b]).collect();

    let mut graph: UnGraph<String, u32> = UnGraph::new_undirected();
    let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(names.len());
    for name in names {
        node_map.insert(name.clone(), graph.add_node(name.clone()));
    }

    for ((a, b), &count) in counts {
        if count <= threshold {
            continue;
        }
        if let (Some(&source), Some(&target)) = (node_map.get(a), node_map.get(b)) {
            graph.add_edge(source, target, count);
        }
    }

    EntityGraph { graph, node_map }
}

/// One row of the flat relation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationRow {
    pub entity_a: String,
    pub entity_b: String,
    pub count: u32,
}

/// All pairs, most frequent first; ties keep pair order.
pub fn relation_table(counts: &PairCounts) -> Vec<RelationRow> {
    let mut rows: Vec<RelationRow> = counts
        .iter()
        .map(|((a, b), &count)| RelationRow {
            entity_a: a.clone(),
            entity_b: b.clone(),
            count,
        })
        .collect();
    // stable sort keeps the BTreeMap order among equal counts
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::RawArticle;
    use crate::entity::{EntityTagger, CapitalizedEntityTagger};

    async fn analyzed(title: &str, description: &str) -> Article {
        let mut article = Article::from_raw(RawArticle {
            title: title.to_string(),
            url: format!("https://example.com/{}", title.len()),
            description: Some(description.to_string()),
            published_date: None,
            publisher: None,
        });
        article.entities = CapitalizedEntityTagger::new()
            .tag(&article.clean_text)
            .await
            .unwrap();
        article
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(canonical_pair("Prabowo", "Gibran"), canonical_pair("Gibran", "Prabowo"));

        let mut forward = PairCounts::new();
        let mut backward = PairCounts::new();
        *forward.entry(canonical_pair("Prabowo", "Gibran")).or_insert(0) += 1;
        *backward.entry(canonical_pair("Gibran", "Prabowo")).or_insert(0) += 1;
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_counts_distinct_pairs_per_sentence() {
        let text = "Budi bertemu Andi dan Budi. Andi menolak Citra. RI tolak G20 dan Citra.";
        let entities = vec![
            Entity::new(0, 4, "Budi", crate::entity::EntityType::Person),
            Entity::new(13, 17, "Andi", crate::entity::EntityType::Person),
            Entity::new(22, 26, "Budi", crate::entity::EntityType::Person),
            Entity::new(28, 32, "Andi", crate::entity::EntityType::Person),
            Entity::new(41, 46, "Citra", crate::entity::EntityType::Person),
            Entity::new(48, 50, "RI", crate::entity::EntityType::Location),
            Entity::new(57, 60, "G20", crate::entity::EntityType::Organization),
            Entity::new(65, 70, "Citra", crate::entity::EntityType::Person),
        ];
        let counts = count_article_pairs(text, &entities, SentenceMatching::Offsets);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&canonical_pair("Budi", "Andi")], 1);
        assert_eq!(counts[&canonical_pair("Citra", "Andi")], 1);
    }

    #[test]
    fn test_graph_edges_only_above_threshold() {
        let mut counts = PairCounts::new();
        counts.insert(canonical_pair("Jokowi", "Prabowo"), 3);
        counts.insert(canonical_pair("Jokowi", "Anies"), 1);
        counts.insert(canonical_pair("Anies", "Ganjar"), 2);

        let graph = build_graph(&counts, 1);
        assert_eq!(graph.nodes(), vec!["Anies", "Ganjar", "Jokowi", "Prabowo"]);
        for ((a, b), count) in &counts {
            assert_eq!(graph.has_edge(a, b), *count > 1);
            assert_eq!(graph.has_edge(b, a), *count > 1);
        }
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight("Prabowo", "Jokowi"), Some(3));
        assert_eq!(graph.weight("Jokowi", "Anies"), None);
        assert_eq!(graph.weight("Jokowi", "Megawati"), None);

        let table = relation_table(&counts);
        let order: Vec<u32> = table.iter().map(|r| r.count).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_graph_serializes_as_nodes_and_edges() {
        let mut counts = PairCounts::new();
        counts.insert(canonical_pair("Prabowo", "Jokowi"), 2);
        counts.insert(canonical_pair("Jokowi", "Anies"), 1);

        let json = serde_json::to_value(build_graph(&counts, 1)).unwrap();
        assert_eq!(json["nodes"], serde_json::json!(["Anies", "Jokowi", "Prabowo"]));
        assert_eq!(
            json["edges"],
            serde_json::json!([{"source": "Jokowi", "target": "Prabowo", "weight": 2}])
        );
        assert_eq!(build_graph(&counts, 1), build_graph(&counts.clone(), 1));
        assert_eq!(build_graph(&PairCounts::new(), 1).node_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_counts_merge_across_articles() {
        let articles = vec![
            analyzed("Presiden Prabowo Subianto menemui Gibran Rakabuming", "Pertemuan berlangsung di Istana.").await,
            analyzed("Prabowo Subianto dan Gibran Rakabuming rapat", "Menteri Sri Mulyani hadir.").await,
        ];
        let counts = count_pairs(&articles, SentenceMatching::Offsets);
        assert_eq!(
            counts.get(&canonical_pair("Prabowo Subianto", "Gibran Rakabuming")),
            Some(&2)
        );
        let graph = build_graph(&counts, 1);
        assert!(graph.has_edge("Gibran Rakabuming", "Prabowo Subianto"));
    }
}
