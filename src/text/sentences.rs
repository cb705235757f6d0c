use serde::Serialize;

/// A sentence of a clean text together with its byte range in that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

impl Sentence<'_> {
    /// True when the byte range `start..end` lies entirely inside this sentence.
    pub fn contains_span(&self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split text into sentences.
///
/// A sentence ends after `.`, `!` or `?` when the next character is
/// whitespace or the end of the text, so decimals such as `10.5` stay intact.
/// Sentences are trimmed and empty ones are dropped; ranges point into `text`.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }
        let boundary = match chars.peek() {
            None => true,
            Some((_, next)) => next.is_whitespace(),
        };
        if boundary {
            let end = idx + c.len_utf8();
            push_trimmed(text, start, end, &mut sentences);
            start = end;
        }
    }
    push_trimmed(text, start, text.len(), &mut sentences);

    sentences
}

fn push_trimmed<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Sentence<'a>>) {
    let raw = &text[start..end];
    let trimmed_start = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let start = start + trimmed_start;
    out.push(Sentence {
        start,
        end: start + trimmed.len(),
        text: trimmed,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_with_ranges() {
        let text = "Jokowi bertemu Prabowo. Harga naik 10.5 persen! Benarkah?";
        let sentences = split_sentences(text);
        let texts: Vec<&str> = sentences.iter().map(|s| s.text).collect();
        assert_eq!(
            texts,
            vec![
                "Jokowi bertemu Prabowo.",
                "Harga naik 10.5 persen!",
                "Benarkah?"
            ]
        );
        for sentence in &sentences {
            assert_eq!(&text[sentence.start..sentence.end], sentence.text);
        }
    }

    #[test]
    fn test_trailing_fragment_without_punctuation() {
        let sentences = split_sentences("Satu. dua tanpa titik");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "dua tanpa titik");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
        let sentences = split_sentences("... !");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_multibyte_text_keeps_boundaries() {
        let text = "Menteri Ñoño hadir. Café ditutup.";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(&text[sentences[1].start..sentences[1].end], "Café ditutup.");
        assert!(sentences[0].contains_span(8, 14));
        assert!(!sentences[0].contains_span(8, sentences[1].start + 1));
    }
}
