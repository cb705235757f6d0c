use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

// Function words that would otherwise dominate every corpus
const INDONESIAN_STOPWORDS: &[&str] = &[
    "yang", "dan", "di", "ke", "dari", "dengan", "untuk", "pada", "juga", "tersebut", "ini",
    "itu", "adalah", "akan", "sebagai", "saat", "telah", "bagi", "kata", "oleh", "tidak", "bisa",
    "para", "mereka", "harus", "sudah", "melakukan", "ada", "pun", "tentang", "serta", "seperti",
    "masih", "maupun", "dalam", "antara", "hingga", "mengatakan", "pihak", "tahun", "baru",
    "kembali", "usai", "melalui", "mendapatkan", "selama", "setelah", "atau", "karena", "kami",
    "kita", "ia", "dia", "lebih", "agar", "jika", "namun", "sebuah", "secara", "yakni",
];

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "with", "at", "by", "from",
    "is", "are", "was", "were", "be", "been", "it", "its", "this", "that", "as", "has", "have",
    "had", "not", "but", "he", "she", "they", "we", "you", "his", "her", "their", "after",
    "over", "into", "said", "says", "will", "would", "new",
];

/// Case-insensitive stopword set.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::with_extra::<&str>(&[])
    }
}

impl StopWords {
    /// Built-in Indonesian and English lists plus `extra`.
    pub fn with_extra<S: AsRef<str>>(extra: &[S]) -> Self {
        let words = INDONESIAN_STOPWORDS
            .iter()
            .chain(ENGLISH_STOPWORDS.iter())
            .map(|w| w.to_string())
            .chain(extra.iter().map(|w| w.as_ref().trim().to_lowercase()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Lowercased content words of `text`.
///
/// Drops stopwords, single characters and tokens made only of digits or
/// punctuation.
pub fn tokenize_words(text: &str, stopwords: &StopWords) -> Vec<String> {
    text.unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| w.chars().any(|c| c.is_alphabetic()))
        .filter(|w| !stopwords.contains(w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_noise() {
        let stopwords = StopWords::default();
        let words = tokenize_words("Harga beras di Jakarta naik 10% pada 2024, kata BPS.", &stopwords);
        assert_eq!(words, vec!["harga", "beras", "jakarta", "naik", "bps"]);
    }

    #[test]
    fn test_extra_stopwords_are_case_insensitive() {
        let stopwords = StopWords::with_extra(&["Jakarta ", ""]);
        assert!(stopwords.contains("JAKARTA"));
        assert!(stopwords.contains("Yang"));
        assert!(!stopwords.contains("beras"));
    }
}
