use super::fuzzy::similarity;
use super::{is_yes, normalize, words};

const THRESHOLD: f64 = 0.7;

const CONFIRM: &[&str] = &["confirm", "confirmed", "book", "book it", "proceed", "yes"];
const CANCEL: &[&str] = &["cancel", "no", "restart", "start over"];

// Single words that settle the answer inside a longer reply ("book now").
const CONFIRM_WORDS: &[&str] = &["book", "confirm", "confirmed", "proceed"];
const CANCEL_WORDS: &[&str] = &["cancel", "restart", "no", "not", "don't", "dont"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirm,
    Cancel,
}

pub fn parse_confirmation(text: &str) -> Option<Confirmation> {
    let text = normalize(text);
    let text = text.trim_matches(|c: char| !c.is_alphanumeric());
    if text.is_empty() {
        return None;
    }

    let confirm = score(text, CONFIRM);
    let cancel = score(text, CANCEL);
    if confirm >= THRESHOLD && confirm > cancel {
        return Some(Confirmation::Confirm);
    }
    if cancel >= THRESHOLD && cancel > confirm {
        return Some(Confirmation::Cancel);
    }

    let tokens = words(text);
    let has = |vocabulary: &[&str]| tokens.iter().any(|t| vocabulary.contains(&t.as_str()));
    match (has(CONFIRM_WORDS), has(CANCEL_WORDS)) {
        (true, false) => return Some(Confirmation::Confirm),
        (false, true) => return Some(Confirmation::Cancel),
        (true, true) => return None,
        (false, false) => {}
    }

    match is_yes(text) {
        Some(true) => Some(Confirmation::Confirm),
        Some(false) => Some(Confirmation::Cancel),
        None => None,
    }
}

fn score(text: &str, vocabulary: &[&str]) -> f64 {
    vocabulary
        .iter()
        .map(|w| similarity(text, w))
        .fold(0.0, f64::max)
}
