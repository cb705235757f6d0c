use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{highlight_entities, Entity};
use crate::sentiment::SentimentResult;
use crate::text::clean_text_for_analysis;
use crate::topic::OUTLIER_TOPIC_ID;

/// Publisher block as delivered by the news source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

/// One article as handed over by the retrieval collaborator.
///
/// Field names follow the loosely shaped records news clients return; every
/// field except the title and url may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "published date", alias = "published_date")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub publisher: Option<Publisher>,
}

/// An ingested article together with everything the engine attaches to it.
///
/// `clean_text` is set at construction. Sentiment, entities, the summary and
/// the topic are filled in by a single analysis pass and are read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub publisher: String,
    pub clean_text: String,
    pub sentiment: Option<SentimentResult>,
    pub entities: Vec<Entity>,
    pub summary: Option<String>,
    pub topic_id: i32,
    pub topic_name: Option<String>,
}

impl Article {
    pub fn from_raw(raw: RawArticle) -> Self {
        let clean_text = clean_text_for_analysis(&raw.title, raw.description.as_deref());
        let published_date = raw.published_date.as_deref().and_then(parse_date);
        let publisher = raw
            .publisher
            .and_then(|p| p.title)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string());

        Article {
            title: raw.title,
            url: raw.url,
            description: raw.description,
            published_date,
            publisher,
            clean_text,
            sentiment: None,
            entities: Vec::new(),
            summary: None,
            topic_id: OUTLIER_TOPIC_ID,
            topic_name: None,
        }
    }

    /// Calendar day of publication in UTC.
    pub fn published_day(&self) -> Option<NaiveDate> {
        self.published_date.map(|d| d.date_naive())
    }

    /// Clean text as HTML with the extracted entities marked up.
    pub fn highlighted_html(&self) -> String {
        highlight_entities(&self.clean_text, &self.entities)
    }

    /// Signed sentiment score, 0 when the article has not been scored.
    pub fn signed_score(&self) -> f64 {
        self.sentiment.as_ref().map(|s| s.signed_score()).unwrap_or(0.0)
    }
}

/// Parse a date string in the formats news feeds commonly use.
///
/// Values without timezone information are taken as UTC.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    // RFC2822, including the "GMT" suffix feeds like to use
    if let Ok(date) = DateTime::parse_from_rfc2822(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = DateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Utc));
    }

    for format in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(date_str, format) {
            return Some(naive.and_utc());
        }
    }

    for format in &["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(day) = NaiveDate::parse_from_str(date_str, format) {
            return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}
