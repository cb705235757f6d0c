//! Capitalization-based entity tagger used when no NER model is configured.
//!
//! Runs of capitalized words are candidates; the type comes from honorifics,
//! organization markers, a small place gazetteer and calendar words.

use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use super::extraction::EntityTagger;
use super::types::{Entity, EntityType};

lazy_static! {
    static ref CAPITALIZED_RUN: Regex =
        Regex::new(r"\p{Lu}[\p{L}\p{N}&'-]*(?:[ \t]+\p{Lu}[\p{L}\p{N}&'-]*)*").unwrap();
    static ref HONORIFICS: HashSet<&'static str> = [
        "presiden", "wakil", "menteri", "gubernur", "bupati", "walikota", "wali", "bapak", "ibu",
        "pak", "bu", "kapolri", "jenderal", "ketua", "direktur", "mr", "mrs", "ms", "dr",
        "president", "minister", "governor", "ceo", "sen", "senator",
    ]
    .into_iter()
    .collect();
    static ref ORG_MARKERS: HashSet<&'static str> = [
        "pt", "perum", "tbk", "bank", "kementerian", "kemenkeu", "badan", "partai", "universitas", "komisi",
        "dewan", "pemerintah", "pemprov", "pemkot", "pemkab", "polri", "polda", "polres", "tni",
        "dpr", "mpr", "kpk", "bumn", "ojk", "bps", "inc", "corp", "corporation", "ltd", "group",
        "company", "university", "ministry", "agency", "council", "party",
    ]
    .into_iter()
    .collect();
    static ref PLACE_MARKERS: HashSet<&'static str> = [
        "kota", "provinsi", "kabupaten", "pulau", "kecamatan", "desa", "selat", "gunung", "teluk",
        "city", "province", "island",
    ]
    .into_iter()
    .collect();
    static ref GAZETTEER: HashSet<&'static str> = [
        "indonesia", "jakarta", "nusantara", "ikn", "kalimantan", "jawa", "bali", "sumatera",
        "sulawesi", "papua", "surabaya", "bandung", "medan", "semarang", "yogyakarta", "makassar",
        "balikpapan", "penajam", "singapura", "malaysia", "china", "tiongkok", "amerika",
        "jepang", "australia", "eropa", "rusia", "ukraina", "singapore", "japan", "america",
        "europe", "russia", "ukraine",
    ]
    .into_iter()
    .collect();
    static ref CALENDAR_WORDS: HashSet<&'static str> = [
        "januari", "februari", "maret", "april", "mei", "juni", "juli", "agustus", "september",
        "oktober", "november", "desember", "senin", "selasa", "rabu", "kamis", "jumat", "sabtu",
        "minggu", "january", "february", "march", "may", "june", "july", "august", "october",
        "december", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    ]
    .into_iter()
    .collect();
    static ref LOCATIVE_PREPOSITIONS: HashSet<&'static str> =
        ["di", "ke", "dari", "in", "at", "to", "from"].into_iter().collect();
}

#[derive(Debug, Default)]
pub struct CapitalizedEntityTagger;

impl CapitalizedEntityTagger {
    pub fn new() -> Self {
        Self
    }

    fn classify(words: &[&str], previous: Option<&str>) -> EntityType {
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        if lowered.iter().all(|w| CALENDAR_WORDS.contains(w.as_str())) {
            return EntityType::Time;
        }
        if lowered.iter().any(|w| ORG_MARKERS.contains(w.as_str())) {
            return EntityType::Organization;
        }
        if PLACE_MARKERS.contains(lowered[0].as_str())
            || lowered.iter().all(|w| GAZETTEER.contains(w.as_str()))
        {
            return EntityType::Location;
        }
        // Acronyms such as "PLN" are almost always institutions
        if words.len() == 1 && words[0].chars().count() >= 2 && words[0].chars().all(|c| c.is_uppercase()) {
            return EntityType::Organization;
        }
        let previous = previous.map(|p| p.to_lowercase());
        if let Some(previous) = previous.as_deref() {
            if HONORIFICS.contains(previous) {
                return EntityType::Person;
            }
            if LOCATIVE_PREPOSITIONS.contains(previous) {
                return EntityType::Location;
            }
        }
        if words.len() >= 2 {
            return EntityType::Person;
        }
        EntityType::Misc
    }
}

/// The word right before byte offset `start`, if it is in the same sentence.
fn previous_word(text: &str, start: usize) -> Option<&str> {
    let before = text[..start].trim_end();
    if before.is_empty() || before.ends_with(['.', '!', '?']) {
        return None;
    }
    before
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
}

fn starts_sentence(text: &str, start: usize) -> bool {
    let before = text[..start].trim_end();
    before.is_empty() || before.ends_with(['.', '!', '?', '"', ':'])
}

#[async_trait]
impl EntityTagger for CapitalizedEntityTagger {
    fn name(&self) -> &str {
        "capitalized-heuristic"
    }

    async fn tag(&self, text: &str) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();

        for found in CAPITALIZED_RUN.find_iter(text) {
            let mut start = found.start();
            let end = found.end();
            let mut words: Vec<&str> = found.as_str().split_whitespace().collect();
            let mut previous = previous_word(text, start);

            // "Presiden Joko Widodo": the honorific is context, not part of the name
            while words.len() > 1 && HONORIFICS.contains(words[0].to_lowercase().as_str()) {
                previous = Some(words[0]);
                let after = start + words[0].len();
                let rest = &text[after..end];
                start = after + (rest.len() - rest.trim_start().len());
                words.remove(0);
            }

            let surface = text[start..end].trim_end_matches(['-', '\'']);
            let end = start + surface.len();
            if surface.is_empty() {
                continue;
            }

            let entity_type = Self::classify(&words, previous);

            // A capital at the start of a sentence is usually just grammar
            if words.len() == 1
                && entity_type == EntityType::Misc
                && starts_sentence(text, start)
            {
                continue;
            }
            if words.len() == 1 && HONORIFICS.contains(words[0].to_lowercase().as_str()) {
                continue;
            }

            entities.push(Entity::new(start, end, surface, entity_type));
        }

        Ok(entities)
    }
}
