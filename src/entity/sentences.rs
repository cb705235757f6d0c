use super::types::Entity;
use crate::environment::SentenceMatching;
use crate::text::{split_sentences, Sentence};

/// The entity mentions attached to one sentence of an article.
#[derive(Debug, Clone)]
pub struct SentenceEntities<'a> {
    pub sentence: Sentence<'a>,
    pub entities: Vec<&'a Entity>,
}

impl<'a> SentenceEntities<'a> {
    /// Distinct qualifying surface strings, in order of first appearance.
    pub fn qualifying_surfaces(&self) -> Vec<&'a str> {
        let mut surfaces: Vec<&'a str> = Vec::new();
        for entity in &self.entities {
            if !entity.is_qualifying() {
                continue;
            }
            let surface = entity.surface();
            if !surfaces.contains(&surface) {
                surfaces.push(surface);
            }
        }
        surfaces
    }
}

/// Attach an article's entities to the sentences of its clean text.
///
/// With [`SentenceMatching::Offsets`] a mention belongs to the sentence whose
/// byte range contains its span; mentions straddling two sentences belong to
/// none. With [`SentenceMatching::Substring`] a mention belongs to every
/// sentence that contains its text literally, so repeated names attach to all
/// their occurrences. Entities with invalid spans are skipped in both modes.
/// Sentences without entities are left out.
pub fn group_by_sentence<'a>(
    text: &'a str,
    entities: &'a [Entity],
    mode: SentenceMatching,
) -> Vec<SentenceEntities<'a>> {
    let valid: Vec<&Entity> = entities.iter().filter(|e| e.has_valid_span(text)).collect();

    split_sentences(text)
        .into_iter()
        .filter_map(|sentence| {
            let attached: Vec<&Entity> = valid
                .iter()
                .copied()
                .filter(|entity| match mode {
                    SentenceMatching::Offsets => sentence.contains_span(entity.start, entity.end),
                    SentenceMatching::Substring => {
                        !entity.surface().is_empty() && sentence.text.contains(entity.surface())
                    }
                })
                .collect();
            if attached.is_empty() {
                None
            } else {
                Some(SentenceEntities {
                    sentence,
                    entities: attached,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::types::EntityType;

    fn sample() -> (&'static str, Vec<Entity>) {
        let text = "Budi bertemu Andi. Andi menolak.";
        let entities = vec![
            Entity::new(0, 4, "Budi", EntityType::Person),
            Entity::new(13, 17, "Andi", EntityType::Person),
            Entity::new(19, 23, "Andi", EntityType::Person),
        ];
        (text, entities)
    }

    #[test]
    fn test_offsets_attach_each_mention_once() {
        let (text, entities) = sample();
        let groups = group_by_sentence(text, &entities, SentenceMatching::Offsets);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].qualifying_surfaces(), vec!["Budi", "Andi"]);
        assert_eq!(groups[1].entities.len(), 1);
        assert_eq!(groups[1].entities[0].start, 19);
    }

    #[test]
    fn test_substring_attaches_repeated_names_everywhere() {
        let (text, entities) = sample();
        let groups = group_by_sentence(text, &entities, SentenceMatching::Substring);
        assert_eq!(groups.len(), 2);
        // both "Andi" mentions match the literal text of each sentence
        assert_eq!(groups[0].entities.len(), 3);
        assert_eq!(groups[1].entities.len(), 2);
        assert_eq!(groups[0].qualifying_surfaces(), vec!["Budi", "Andi"]);
        assert_eq!(groups[1].qualifying_surfaces(), vec!["Andi"]);
    }

    #[test]
    fn test_straddling_and_invalid_spans_are_ignored() {
        let text = "Kota Baru. Lama sekali.";
        let entities = vec![
            Entity::new(5, 15, "Baru. Lama", EntityType::Location),
            Entity::new(20, 99, "oops", EntityType::Misc),
        ];
        assert!(group_by_sentence(text, &entities, SentenceMatching::Offsets).is_empty());
    }

    #[test]
    fn test_unqualified_surfaces_are_filtered() {
        let text = "RI dan G20 bertemu Jokowi.";
        let entities = vec![
            Entity::new(0, 2, "RI", EntityType::Location),
            Entity::new(7, 10, "G20", EntityType::Organization),
            Entity::new(19, 25, "Jokowi", EntityType::Person),
        ];
        let groups = group_by_sentence(text, &entities, SentenceMatching::Offsets);
        assert_eq!(groups[0].entities.len(), 3);
        assert_eq!(groups[0].qualifying_surfaces(), vec!["Jokowi"]);
    }
}
