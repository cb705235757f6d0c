use serde::Serialize;
use std::collections::HashMap;

use crate::text::{tokenize_words, StopWords};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Word frequencies over every clean text, for word-cloud rendering.
///
/// Sorted by count then word, truncated to `max_words`.
pub fn word_corpus<'a, I>(texts: I, stopwords: &StopWords, max_words: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in tokenize_words(text, stopwords) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut corpus: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    corpus.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    corpus.truncate(max_words);
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_counts_across_texts() {
        let corpus = word_corpus(
            ["Harga beras naik.", "Harga cabai naik, harga bawang turun 5%."],
            &StopWords::default(),
            3,
        );
        assert_eq!(
            corpus,
            vec![
                WordCount { word: "harga".to_string(), count: 3 },
                WordCount { word: "naik".to_string(), count: 2 },
                WordCount { word: "bawang".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_corpus_skips_stopwords_and_numbers() {
        let stopwords = StopWords::with_extra(&["banjir"]);
        let corpus = word_corpus(["Banjir di 2024 yang parah"], &stopwords, 10);
        let words: Vec<&str> = corpus.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["parah"]);
    }
}
