//! Lexicon-based sentiment classifier used when no external model is configured.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

use super::{SentimentLabel, SentimentModel, SentimentResult};

const POSITIVE_WORDS: &[&str] = &[
    // Indonesian
    "naik", "meningkat", "tumbuh", "untung", "sukses", "berhasil", "positif", "baik", "bagus",
    "menguat", "melonjak", "unggul", "menang", "mendukung", "optimis", "stabil", "lancar",
    "meresmikan", "apresiasi", "prestasi", "aman", "sejahtera",
    // English
    "gain", "gains", "rise", "rises", "growth", "profit", "success", "win", "wins", "strong",
    "improve", "improves", "record", "good", "great", "positive", "support", "boost",
];

const NEGATIVE_WORDS: &[&str] = &[
    // Indonesian
    "turun", "menurun", "anjlok", "rugi", "gagal", "negatif", "buruk", "melemah", "merosot",
    "kalah", "korupsi", "krisis", "bencana", "banjir", "tewas", "kecelakaan", "protes", "demo",
    "tersangka", "ditangkap", "mangkrak", "kritik", "ancaman", "konflik",
    // English
    "fall", "falls", "drop", "drops", "loss", "losses", "fail", "fails", "weak", "crisis",
    "crash", "death", "dead", "protest", "corruption", "arrested", "decline", "declines",
    "negative", "bad", "threat", "conflict",
];

pub struct LexiconSentimentModel {
    name: String,
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl Default for LexiconSentimentModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconSentimentModel {
    pub fn new() -> Self {
        Self::with_name("sentiment-lexicon")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }

    fn count_hits(&self, text: &str) -> (usize, usize) {
        let mut positive_hits = 0;
        let mut negative_hits = 0;
        for word in text.unicode_words() {
            let word = word.to_lowercase();
            if self.positive.contains(word.as_str()) {
                positive_hits += 1;
            } else if self.negative.contains(word.as_str()) {
                negative_hits += 1;
            }
        }
        (positive_hits, negative_hits)
    }
}

#[async_trait]
impl SentimentModel for LexiconSentimentModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        let (positive_hits, negative_hits) = self.count_hits(text);
        let total = positive_hits + negative_hits;

        if total == 0 || positive_hits == negative_hits {
            return Ok(SentimentResult::new(SentimentLabel::Neutral, 0.5));
        }

        let margin = (positive_hits as f64 - negative_hits as f64).abs() / total as f64;
        let confidence = 0.5 + 0.5 * margin;
        let label = if positive_hits > negative_hits {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };

        Ok(SentimentResult::new(label, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lexicon_polarity() {
        let model = LexiconSentimentModel::new();

        let up = model.classify("Harga A naik. Harga A naik 10%").await.unwrap();
        assert_eq!(up.label, SentimentLabel::Positive);
        assert_eq!(up.confidence, 1.0);

        let down = model.classify("Saham anjlok, investor rugi").await.unwrap();
        assert_eq!(down.label, SentimentLabel::Negative);

        let mixed = model.classify("Harga naik lalu turun").await.unwrap();
        assert_eq!(mixed.label, SentimentLabel::Neutral);
        assert_eq!(mixed.signed_score(), 0.0);
    }

    #[tokio::test]
    async fn test_partial_margin() {
        let model = LexiconSentimentModel::new();
        // two positive, one negative
        let result = model.classify("Ekonomi tumbuh dan stabil meski ada krisis").await.unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!((result.confidence - (0.5 + 0.5 / 3.0)).abs() < 1e-9);
    }
}
