use once_cell::sync::Lazy;
use regex::Regex;

use super::fuzzy::best_match;
use super::{normalize, number_word, number_word_list, words};
use crate::models::{MAX_GUESTS, MIN_GUESTS};

const NUMBER_WORD_THRESHOLD: f64 = 0.8;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid pattern"));

const SOLO_PHRASES: &[&str] = &["just me", "only me", "me alone", "just myself", "me myself"];
const SOLO_WORDS: &[&str] = &["me", "myself", "solo", "alone", "single"];
const PAIR_PHRASES: &[&str] = &["couple", "pair", "both", "us two"];
// A solo idiom next to these means someone else is coming too.
const COMPANION_WORDS: &[&str] = &["and", "with", "plus"];
const OUT_OF_RANGE_WORDS: &[&str] = &[
    "zero", "none", "nobody", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "twenty",
    "thirty", "fifty", "hundred", "dozen", "dozens", "many",
];

/// Guest count in `1..=10`, from digits, number words or a few idioms.
pub fn parse_guests(text: &str) -> Option<u8> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }

    // The first number typed decides; "11 people" must not fall back to a word.
    if let Some(m) = DIGITS.find(&text) {
        return m.as_str().parse::<u8>().ok().filter(in_range);
    }

    let tokens = words(&text);

    if tokens
        .iter()
        .any(|t| OUT_OF_RANGE_WORDS.contains(&t.as_str()))
    {
        return None;
    }

    let solo = SOLO_PHRASES.iter().any(|p| has_phrase(&tokens, p))
        || (tokens.len() <= 2 && tokens.iter().any(|t| SOLO_WORDS.contains(&t.as_str())));
    if solo {
        if tokens.iter().any(|t| COMPANION_WORDS.contains(&t.as_str())) {
            return None;
        }
        return Some(1);
    }

    if PAIR_PHRASES.iter().any(|p| has_phrase(&tokens, p)) {
        return Some(2);
    }

    if let Some(n) = tokens.iter().find_map(|t| number_word(t)) {
        return Some(n);
    }

    let candidates: Vec<&str> = number_word_list().collect();
    tokens
        .iter()
        .filter(|t| t.chars().count() >= 3)
        .find_map(|t| best_match(t, &candidates, NUMBER_WORD_THRESHOLD))
        .and_then(number_word)
}

fn has_phrase(tokens: &[String], phrase: &str) -> bool {
    let parts: Vec<&str> = phrase.split(' ').collect();
    tokens
        .windows(parts.len())
        .any(|window| window.iter().zip(&parts).all(|(t, p)| t.as_str() == *p))
}

fn in_range(n: &u8) -> bool {
    (MIN_GUESTS..=MAX_GUESTS).contains(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        assert_eq!(parse_guests("2"), Some(2));
        assert_eq!(parse_guests("4 people"), Some(4));
        assert_eq!(parse_guests("we are 10"), Some(10));
    }

    #[test]
    fn test_digits_out_of_range() {
        assert_eq!(parse_guests("0"), None);
        assert_eq!(parse_guests("11"), None);
        assert_eq!(parse_guests("11 guests, maybe two"), None);
        assert_eq!(parse_guests("999999999999"), None);
    }

    #[test]
    fn test_words() {
        assert_eq!(parse_guests("two"), Some(2));
        assert_eq!(parse_guests("Five guests please"), Some(5));
        assert_eq!(parse_guests("ten"), Some(10));
        assert_eq!(parse_guests("a couple"), Some(2));
    }

    #[test]
    fn test_solo_idioms() {
        assert_eq!(parse_guests("just me"), Some(1));
        assert_eq!(parse_guests("Myself"), Some(1));
        assert_eq!(parse_guests("travelling solo"), Some(1));
    }

    #[test]
    fn test_misspelled_number_words() {
        assert_eq!(parse_guests("thre"), Some(3));
        assert_eq!(parse_guests("sevn people"), Some(7));
    }

    #[test]
    fn test_rejects_noise_and_out_of_range_words() {
        assert_eq!(parse_guests(""), None);
        assert_eq!(parse_guests("lots"), None);
        assert_eq!(parse_guests("the whole family"), None);
        assert_eq!(parse_guests("none"), None);
        assert_eq!(parse_guests("eleven"), None);
        assert_eq!(parse_guests("a dozen"), None);
    }

    #[test]
    fn test_idioms_match_whole_words() {
        assert_eq!(parse_guests("just me and my wife"), None);
        assert_eq!(parse_guests("only me, with my kids"), None);
        assert_eq!(parse_guests("repair"), None);
        assert_eq!(parse_guests("the pair of us"), Some(2));
        assert_eq!(parse_guests("Just me."), Some(1));
    }
}
