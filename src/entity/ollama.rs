use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::extraction::{parse_entity_response, EntityTagger};
use super::types::Entity;
use crate::llm::{generate_json_response, LlmParams};
use crate::TARGET_ENTITY;

/// Entity tagger backed by an Ollama-served LLM.
///
/// The model only names entities; spans come from locating every literal
/// occurrence of each name in the text.
pub struct OllamaEntityTagger {
    params: LlmParams,
}

impl OllamaEntityTagger {
    pub fn new(params: LlmParams) -> Self {
        Self { params }
    }
}

fn entity_extraction_prompt(text: &str) -> String {
    format!(
        r#"
NEWS TEXT (FOR ENTITY EXTRACTION):
----------
{text}
----------

TASK: List the named entities that appear in the text.

GUIDELINES:
1. Use exactly these types:
   - PERSON: individual people
   - ORGANIZATION: companies, institutions, ministries, parties, agencies
   - LOCATION: countries, cities, regions, landmarks
   - TIME: dates, days, months
   - MISC: any other named thing
2. Copy each name exactly as it is written in the text.
3. List each distinct name once.

RETURN FORMAT (JSON):
{{
  "entities": [
    {{"name": "Exact name as it appears in text", "type": "PERSON|ORGANIZATION|LOCATION|TIME|MISC"}}
  ]
}}
"#
    )
}

#[async_trait]
impl EntityTagger for OllamaEntityTagger {
    fn name(&self) -> &str {
        &self.params.model
    }

    async fn tag(&self, text: &str) -> Result<Vec<Entity>> {
        let response = generate_json_response(&entity_extraction_prompt(text), &self.params)
            .await
            .ok_or_else(|| anyhow::anyhow!("Entity extraction failed: No response from LLM"))?;
        let entities = parse_entity_response(text, &response)?;
        info!(
            target: TARGET_ENTITY,
            "Successfully extracted {} entity mentions from article text",
            entities.len()
        );
        Ok(entities)
    }
}
