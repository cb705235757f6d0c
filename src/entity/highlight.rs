use super::types::{Entity, EntityType};

fn colour(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Person => "#ffadad",
        EntityType::Organization => "#a0c4ff",
        EntityType::Location => "#fdffb6",
        EntityType::Time => "#caffbf",
        EntityType::Misc => "#bdb2ff",
    }
}

fn label(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Person => "Person",
        EntityType::Organization => "Organization",
        EntityType::Location => "Location",
        EntityType::Time => "Time",
        EntityType::Misc => "Misc",
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render `text` as HTML with every entity wrapped in a coloured `<mark>`.
///
/// Entities are taken in start order; spans that are out of bounds or
/// overlap an earlier entity are skipped.
pub fn highlight_entities(text: &str, entities: &[Entity]) -> String {
    let mut ordered: Vec<&Entity> = entities.iter().collect();
    ordered.sort_by_key(|e| (e.start, e.end));

    let mut html = String::with_capacity(text.len() * 2);
    let mut last_idx = 0;

    for entity in ordered {
        if !entity.has_valid_span(text) || entity.start < last_idx {
            continue;
        }
        html.push_str(&escape_html(&text[last_idx..entity.start]));
        html.push_str(&format!(
            "<mark style='background-color: {};'>{} <span style='font-size: 0.75em; font-weight: bold; color: #555;'>{}</span></mark>",
            colour(entity.entity_type),
            escape_html(&text[entity.start..entity.end]),
            label(entity.entity_type)
        ));
        last_idx = entity.end;
    }
    html.push_str(&escape_html(&text[last_idx..]));

    html
}
