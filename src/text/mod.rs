//! Text preparation shared by every analyzer.
//!
//! Turns raw title/description pairs into one clean string, splits clean
//! text into sentences with byte ranges, and tokenizes text for the word
//! corpus and the topic model.

mod sentences;
mod words;

pub use self::sentences::{split_sentences, Sentence};
pub use self::words::{tokenize_words, StopWords};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^<]+?>").unwrap();
}

/// Strip anything that looks like an HTML tag.
pub fn strip_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Combine title and description into the single string every analyzer sees.
///
/// The description is stripped of HTML tags; a missing description counts
/// as empty.
pub fn clean_text_for_analysis(title: &str, description: Option<&str>) -> String {
    let description = normalize(description.unwrap_or(""));
    collapse_whitespace(&format!("{}. {}", title, description))
}

/// Strip tags and collapse whitespace. Clean text is a fixed point.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(&strip_html_tags(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_tags_and_spaces() {
        let cleaned = clean_text_for_analysis(
            "  Harga   A naik ",
            Some("<p>Harga <b>A</b>\n naik   10%</p>"),
        );
        assert_eq!(cleaned, "Harga A naik . Harga A naik 10%");
    }

    #[test]
    fn test_missing_description() {
        assert_eq!(clean_text_for_analysis("A turun", None), "A turun.");
        assert_eq!(clean_text_for_analysis("A turun", Some("")), "A turun.");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Presiden Joko Widodo meresmikan <i>bendungan</i>   baru.",
            "  already clean text ",
            "",
            "Tab\tand\nnewline <br/> mixed",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }

        let clean = "Harga A naik. Harga A naik 10%";
        assert_eq!(normalize(clean), clean);
    }

    #[test]
    fn test_clean_text_is_stable_under_renormalization() {
        let inputs = [
            ("Harga A naik", Some("Harga <b>A</b>   naik 10%")),
            ("  Banjir   Jakarta ", Some("<p>Warga\n mengungsi</p>")),
            ("A turun", None),
        ];
        for (title, description) in inputs {
            let cleaned = clean_text_for_analysis(title, description);
            assert_eq!(normalize(&cleaned), cleaned);

            // feeding an already clean description back in changes nothing
            let clean_description = description.map(normalize);
            assert_eq!(
                clean_text_for_analysis(title, clean_description.as_deref()),
                cleaned
            );
        }
    }

    #[test]
    fn test_unclosed_angle_bracket_is_kept() {
        assert_eq!(normalize("a < b and c"), "a < b and c");
    }
}
