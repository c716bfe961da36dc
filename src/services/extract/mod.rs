//! Stateless field extractors for the booking script.
//!
//! Each extractor takes the raw user text and returns either a validated value
//! or `None` when the text could not be understood. Nothing here errors or
//! panics on malformed input; the conversation layer turns `None` into a
//! reprompt.

pub mod confirm;
pub mod date;
pub mod fuzzy;
pub mod guests;
pub mod name;
pub mod payment;
pub mod yes_no;

pub use confirm::{parse_confirmation, Confirmation};
pub use date::parse_date;
pub use guests::parse_guests;
pub use name::extract_name;
pub use payment::{parse_payment_method, PaymentMethod};
pub use yes_no::is_yes;

const NUMBER_WORDS: &[(&str, u8)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Lower-cases, trims and collapses inner whitespace.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lower-cased words with surrounding punctuation stripped; empty tokens dropped.
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

pub(crate) fn number_word(word: &str) -> Option<u8> {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, n)| *n)
}

pub(crate) fn number_word_list() -> impl Iterator<Item = &'static str> {
    NUMBER_WORDS.iter().map(|(w, _)| *w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Yes   PLEASE \n"), "yes please");
    }

    #[test]
    fn test_words_strip_punctuation() {
        assert_eq!(words("Two, (maybe) three!"), ["two", "maybe", "three"]);
        assert_eq!(words("I'm here"), ["i'm", "here"]);
        assert!(words(" ... ").is_empty());
    }
}
