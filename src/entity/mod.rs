pub mod extraction;
pub mod heuristic;
pub mod highlight;
pub mod ollama;
pub mod sentences;
pub mod types;

pub use extraction::{extract_entities, EntityTagger};
pub use heuristic::CapitalizedEntityTagger;
pub use highlight::highlight_entities;
pub use ollama::OllamaEntityTagger;
pub use sentences::{group_by_sentence, SentenceEntities};
pub use types::*;
