//! Extractive summarizer used when no external model is configured.

use anyhow::Result;
use async_trait::async_trait;

use super::Summarizer;
use crate::text::split_sentences;

/// Keeps the leading sentences of a text up to a word budget.
///
/// The first sentence is always kept, cut at the budget when it alone is
/// longer.
pub struct LeadSummarizer {
    max_words: usize,
}

impl Default for LeadSummarizer {
    fn default() -> Self {
        Self::new(60)
    }
}

impl LeadSummarizer {
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words: max_words.max(1),
        }
    }
}

#[async_trait]
impl Summarizer for LeadSummarizer {
    fn name(&self) -> &str {
        "lead-sentences"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let mut kept: Vec<&str> = Vec::new();
        let mut words = 0;

        for sentence in split_sentences(text) {
            let count = sentence.text.split_whitespace().count();
            if kept.is_empty() && count > self.max_words {
                let cut: Vec<&str> = sentence.text.split_whitespace().take(self.max_words).collect();
                return Ok(format!("{} ...", cut.join(" ")));
            }
            if words + count > self.max_words {
                break;
            }
            kept.push(sentence.text);
            words += count;
        }

        Ok(kept.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keeps_leading_sentences_within_budget() {
        let summarizer = LeadSummarizer::new(8);
        let summary = summarizer
            .summarize("Banjir rendam Jakarta. Warga mengungsi ke masjid. Pemerintah kirim bantuan logistik hari ini.")
            .await
            .unwrap();
        assert_eq!(summary, "Banjir rendam Jakarta. Warga mengungsi ke masjid.");
    }

    #[tokio::test]
    async fn test_long_first_sentence_is_cut() {
        let summarizer = LeadSummarizer::new(3);
        let summary = summarizer
            .summarize("Presiden meresmikan bendungan baru di Jawa Tengah.")
            .await
            .unwrap();
        assert_eq!(summary, "Presiden meresmikan bendungan ...");
    }
}
