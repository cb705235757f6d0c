use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};

use super::types::{Entity, EntityType};
use crate::{Analysis, TARGET_ENTITY};

/// A named-entity tagger over one clean text.
#[async_trait]
pub trait EntityTagger: Send + Sync {
    fn name(&self) -> &str;

    /// Tag entities in `text`; spans are byte offsets into `text`.
    async fn tag(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Run the tagger on one text and clean up its output.
///
/// Entities with spans outside the text are dropped silently, and the result
/// is sorted by start offset. Tagger errors and timeouts degrade to an empty
/// list.
pub async fn extract_entities(
    tagger: &dyn EntityTagger,
    text: &str,
    limit: Duration,
) -> Analysis<Vec<Entity>> {
    if text.trim().is_empty() {
        return Analysis::Complete(Vec::new());
    }

    match timeout(limit, tagger.tag(text)).await {
        Ok(Ok(entities)) => Analysis::Complete(sanitize_entities(text, entities)),
        Ok(Err(e)) => {
            warn!(target: TARGET_ENTITY, "Entity tagger {} failed: {}", tagger.name(), e);
            Analysis::degraded(Vec::new(), format!("entity tagger failed: {}", e))
        }
        Err(_) => {
            warn!(target: TARGET_ENTITY, "Entity tagger {} timed out after {:?}", tagger.name(), limit);
            Analysis::degraded(
                Vec::new(),
                format!("entity tagger timed out after {:?}", limit),
            )
        }
    }
}

/// Drop malformed spans and sort by start offset (then end, for stable output).
pub fn sanitize_entities(text: &str, mut entities: Vec<Entity>) -> Vec<Entity> {
    let before = entities.len();
    entities.retain(|e| e.has_valid_span(text));
    if entities.len() < before {
        debug!(
            target: TARGET_ENTITY,
            "Dropped {} entities with out-of-bounds spans",
            before - entities.len()
        );
    }
    entities.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    entities
}

/// Every non-overlapping literal occurrence of `name` in `text`, as entities.
pub fn locate_mentions(text: &str, name: &str, entity_type: EntityType) -> Vec<Entity> {
    let name = name.trim();
    if name.is_empty() {
        return Vec::new();
    }
    text.match_indices(name)
        .map(|(start, surface)| Entity::new(start, start + surface.len(), surface, entity_type))
        .collect()
}

/// Parse a `{"entities": [{"name", "type"}]}` tagger reply into spans over `text`.
///
/// Names that never occur in the text produce no entity.
pub fn parse_entity_response(text: &str, json_str: &str) -> Result<Vec<Entity>> {
    let json = crate::llm::parse_json_object(json_str).map_err(|e| {
        error!(target: TARGET_ENTITY, "Failed to parse entity response: {}", e);
        e
    })?;

    let entities = match json.get("entities") {
        Some(Value::Array(entities)) => entities,
        Some(other) => {
            error!(
                target: TARGET_ENTITY,
                "The 'entities' field is not an array. Value: {}", other
            );
            return Err(anyhow::anyhow!("The 'entities' field is not an array"));
        }
        None => {
            return Err(anyhow::anyhow!("No entities array in extraction response"));
        }
    };

    let mut seen = HashSet::new();
    let mut located = Vec::new();
    for entity_value in entities {
        let Some(name) = entity_value.get("name").and_then(Value::as_str) else {
            continue;
        };
        let entity_type = entity_value
            .get("type")
            .and_then(Value::as_str)
            .map(EntityType::from)
            .unwrap_or(EntityType::Misc);

        let mentions = locate_mentions(text, name, entity_type);
        if mentions.is_empty() {
            debug!(target: TARGET_ENTITY, "Entity '{}' not found verbatim in text, skipping", name);
        }
        for mention in mentions {
            if seen.insert((mention.start, mention.end)) {
                located.push(mention);
            }
        }
    }

    Ok(located)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTagger(Vec<Entity>);

    #[async_trait]
    impl EntityTagger for FixedTagger {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn tag(&self, _text: &str) -> Result<Vec<Entity>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenTagger;

    #[async_trait]
    impl EntityTagger for BrokenTagger {
        fn name(&self) -> &str {
            "broken"
        }

        async fn tag(&self, _text: &str) -> Result<Vec<Entity>> {
            Err(anyhow::anyhow!("tokenizer missing"))
        }
    }

    #[tokio::test]
    async fn test_extract_sorts_and_drops_bad_spans() {
        let text = "Prabowo bertemu Jokowi di Jakarta.";
        let tagger = FixedTagger(vec![
            Entity::new(26, 33, "Jakarta", EntityType::Location),
            Entity::new(0, 7, "Prabowo", EntityType::Person),
            Entity::new(30, 90, "broken", EntityType::Misc),
            Entity::new(16, 22, "Jokowi", EntityType::Person),
            Entity::new(5, 5, "", EntityType::Misc),
        ]);
        let entities = extract_entities(&tagger, text, Duration::from_secs(1))
            .await
            .into_value();
        let starts: Vec<usize> = entities.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![0, 16, 26]);
    }

    #[tokio::test]
    async fn test_tagger_failure_degrades_to_empty() {
        let result = extract_entities(&BrokenTagger, "Ada teks", Duration::from_secs(1)).await;
        assert!(result.is_degraded());
        assert!(result.into_value().is_empty());
    }

    #[test]
    fn test_parse_entity_response_locates_every_occurrence() {
        let text = "KPK periksa Budi. Budi membantah tuduhan KPK.";
        let response = r#"{"entities": [
            {"name": "KPK", "type": "ORGANIZATION"},
            {"name": "Budi", "type": "PERSON"},
            {"name": "Andi", "type": "PERSON"},
            {"type": "LOCATION"}
        ]}"#;
        let mut entities = parse_entity_response(text, response).unwrap();
        entities.sort_by_key(|e| e.start);
        assert_eq!(entities.len(), 4);
        assert_eq!(entities[0], Entity::new(0, 3, "KPK", EntityType::Organization));
        assert_eq!(entities[1].text, "Budi");
        assert_eq!(entities[3].start, 41);
    }

    #[test]
    fn test_parse_entity_response_rejects_bad_shape() {
        assert!(parse_entity_response("x", r#"{"entities": "none"}"#).is_err());
        assert!(parse_entity_response("x", r#"{"people": []}"#).is_err());
    }
}
