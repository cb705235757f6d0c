use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::article::Article;
use crate::entity::group_by_sentence;
use crate::environment::SentenceMatching;

/// Frequency and mean sentiment of one person or organization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStat {
    pub entity: String,
    pub frequency: usize,
    pub average_sentiment: f64,
}

/// Frequency x sentiment matrix over the batch.
///
/// Every sentence-attached mention of a qualifying Person or Organization
/// counts once and carries its article's signed score. A mention attached to
/// several sentences (substring matching) still counts once. Entities
/// mentioned only once are dropped. Rows are sorted by frequency, then name.
pub fn entity_matrix(articles: &[Article], mode: SentenceMatching) -> Vec<EntityStat> {
    let mut scores: HashMap<&str, Vec<f64>> = HashMap::new();

    for article in articles {
        let score = article.signed_score();
        let mut counted: HashSet<(usize, usize)> = HashSet::new();
        for group in group_by_sentence(&article.clean_text, &article.entities, mode) {
            for entity in group.entities {
                if entity.entity_type.is_actor()
                    && entity.is_qualifying()
                    && counted.insert((entity.start, entity.end))
                {
                    scores.entry(entity.surface()).or_default().push(score);
                }
            }
        }
    }

    let mut matrix: Vec<EntityStat> = scores
        .into_iter()
        .filter(|(_, scores)| scores.len() > 1)
        .map(|(entity, scores)| EntityStat {
            entity: entity.to_string(),
            frequency: scores.len(),
            average_sentiment: scores.iter().sum::<f64>() / scores.len() as f64,
        })
        .collect();
    matrix.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.entity.cmp(&b.entity)));
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::RawArticle;
    use crate::entity::{Entity, EntityType};
    use crate::sentiment::{SentimentLabel, SentimentResult};

    fn article(text_entities: Vec<Entity>, title: &str, label: SentimentLabel, confidence: f64) -> Article {
        let mut article = Article::from_raw(RawArticle {
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            ..Default::default()
        });
        article.entities = text_entities;
        article.sentiment = Some(SentimentResult::new(label, confidence));
        article
    }

    #[test]
    fn test_matrix_keeps_repeated_actors_only() {
        // clean text: "KPK periksa Budi dan Bank Jaya. PBB diam."
        let first = article(
            vec![
                Entity::new(0, 3, "KPK", EntityType::Organization),
                Entity::new(12, 16, "Budi", EntityType::Person),
                Entity::new(21, 30, "Bank Jaya", EntityType::Organization),
                Entity::new(32, 35, "PBB", EntityType::Organization),
            ],
            "KPK periksa Budi dan Bank Jaya. PBB diam",
            SentimentLabel::Negative,
            0.6,
        );
        // clean text: "Budi bebas, KPK kalah."
        let second = article(
            vec![
                Entity::new(0, 4, "Budi", EntityType::Person),
                Entity::new(12, 15, "KPK", EntityType::Organization),
            ],
            "Budi bebas, KPK kalah",
            SentimentLabel::Positive,
            0.8,
        );
        assert_eq!(first.clean_text, "KPK periksa Budi dan Bank Jaya. PBB diam.");
        assert_eq!(&second.clean_text[12..15], "KPK");

        let matrix = entity_matrix(&[first, second], SentenceMatching::Offsets);
        let names: Vec<&str> = matrix.iter().map(|s| s.entity.as_str()).collect();
        assert_eq!(names, vec!["Budi", "KPK"]);
        assert!(matrix.iter().all(|s| s.frequency > 1));
        assert!((matrix[0].average_sentiment - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_name_counts_once_per_mention_in_both_modes() {
        let budi = article(
            vec![
                Entity::new(0, 4, "Budi", EntityType::Person),
                Entity::new(13, 17, "Budi", EntityType::Person),
            ],
            "Budi datang. Budi pergi",
            SentimentLabel::Positive,
            0.5,
        );
        assert_eq!(budi.clean_text, "Budi datang. Budi pergi.");
        let articles = [budi];

        for mode in [SentenceMatching::Offsets, SentenceMatching::Substring] {
            let matrix = entity_matrix(&articles, mode);
            assert_eq!(matrix.len(), 1, "{:?}", mode);
            assert_eq!(matrix[0].entity, "Budi");
            assert_eq!(matrix[0].frequency, 2, "{:?}", mode);
            assert!((matrix[0].average_sentiment - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_locations_and_short_names_are_ignored() {
        let a = article(
            vec![
                Entity::new(0, 7, "Jakarta", EntityType::Location),
                Entity::new(8, 10, "RI", EntityType::Organization),
            ],
            "Jakarta RI",
            SentimentLabel::Neutral,
            0.9,
        );
        let b = a.clone();
        assert!(entity_matrix(&[a, b], SentenceMatching::Offsets).is_empty());
    }
}
