use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Time,
    Misc,
}

impl EntityType {
    /// Only these types take part in the frequency-sentiment matrix.
    pub fn is_actor(&self) -> bool {
        matches!(self, EntityType::Person | EntityType::Organization)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Person => write!(f, "PERSON"),
            EntityType::Organization => write!(f, "ORGANIZATION"),
            EntityType::Location => write!(f, "LOCATION"),
            EntityType::Time => write!(f, "TIME"),
            EntityType::Misc => write!(f, "MISC"),
        }
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PERSON" | "PER" => EntityType::Person,
            "ORGANIZATION" | "ORGANISATION" | "ORG" => EntityType::Organization,
            "LOCATION" | "LOC" | "GPE" => EntityType::Location,
            "TIME" | "DATE" => EntityType::Time,
            _ => EntityType::Misc,
        }
    }
}

/// A typed, span-located named entity inside one article's clean text.
///
/// `start` and `end` are byte offsets into the clean text the entity was
/// extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub entity_type: EntityType,
}

impl Entity {
    pub fn new(start: usize, end: usize, text: &str, entity_type: EntityType) -> Self {
        Entity {
            start,
            end,
            text: text.to_string(),
            entity_type,
        }
    }

    /// Span lies inside `text`, is non-empty and sits on char boundaries.
    pub fn has_valid_span(&self, text: &str) -> bool {
        self.start < self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }

    /// Surface text with surrounding whitespace removed.
    pub fn surface(&self) -> &str {
        self.text.trim()
    }

    /// Long enough and digit-free, so worth counting in matrix and relation analysis.
    pub fn is_qualifying(&self) -> bool {
        let surface = self.surface();
        surface.chars().count() >= 3 && !surface.chars().any(|c| c.is_numeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_from_tagger_labels() {
        assert_eq!(EntityType::from("PER"), EntityType::Person);
        assert_eq!(EntityType::from("organization"), EntityType::Organization);
        assert_eq!(EntityType::from("GPE"), EntityType::Location);
        assert_eq!(EntityType::from("date"), EntityType::Time);
        assert_eq!(EntityType::from("whatever"), EntityType::Misc);
        assert!(EntityType::Person.is_actor());
        assert!(!EntityType::Location.is_actor());
    }

    #[test]
    fn test_span_validation() {
        let text = "Café Jakarta";
        assert!(Entity::new(6, 13, "Jakarta", EntityType::Location).has_valid_span(text));
        assert!(!Entity::new(6, 14, "Jakarta", EntityType::Location).has_valid_span(text));
        assert!(!Entity::new(4, 4, "", EntityType::Misc).has_valid_span(text));
        // 4 is inside the two-byte 'é'
        assert!(!Entity::new(0, 4, "Caf", EntityType::Misc).has_valid_span(text));
    }

    #[test]
    fn test_qualifying_filter() {
        assert!(Entity::new(0, 3, "KPK", EntityType::Organization).is_qualifying());
        assert!(!Entity::new(0, 2, "AB", EntityType::Organization).is_qualifying());
        assert!(!Entity::new(0, 6, "G20 RI", EntityType::Misc).is_qualifying());
        assert!(!Entity::new(0, 5, " Al  ", EntityType::Person).is_qualifying());
    }
}
