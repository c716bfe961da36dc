use super::fuzzy::similarity;
use super::{normalize, words};

const MATCH_THRESHOLD: f64 = 0.65;

// Vocabulary this short is only matched exactly, up to a repeated or swapped
// letter; a single edit would turn "now" into "no" and "yet" into "yes".
const SHORT_WORD: usize = 4;

const YES: &[&str] = &[
    "yes", "y", "yeah", "yea", "yep", "yup", "sure", "ok", "okay", "alright", "definitely",
    "absolutely", "certainly", "of course", "please", "yes please", "correct", "right", "true",
    "confirm", "agreed", "sounds good",
];

const NO: &[&str] = &[
    "no", "n", "nope", "nah", "not", "never", "none", "negative", "false", "incorrect", "wrong",
    "disagree", "refuse", "decline", "no thanks", "no thank you", "skip",
];

/// `Some(true)` for an affirmative answer, `Some(false)` for a negative one and
/// `None` when the text is unrelated or leans both ways.
pub fn is_yes(text: &str) -> Option<bool> {
    let text = normalize(text);
    let text = text.trim_matches(|c: char| !c.is_alphanumeric());
    if text.is_empty() {
        return None;
    }

    if YES.contains(&text) {
        return Some(true);
    }
    if NO.contains(&text) {
        return Some(false);
    }

    // Whole-input typos ("yse", "nope!") before looking at single words.
    let yes_score = best_score(text, YES);
    let no_score = best_score(text, NO);
    if yes_score >= MATCH_THRESHOLD || no_score >= MATCH_THRESHOLD {
        if yes_score > no_score {
            return Some(true);
        }
        if no_score > yes_score {
            return Some(false);
        }
        return None;
    }

    let tokens = words(text);
    let yes_votes = tokens.iter().filter(|t| votes_for(t, YES)).count();
    let no_votes = tokens.iter().filter(|t| votes_for(t, NO)).count();

    match yes_votes.cmp(&no_votes) {
        std::cmp::Ordering::Greater => Some(true),
        std::cmp::Ordering::Less => Some(false),
        std::cmp::Ordering::Equal => None,
    }
}

fn best_score(text: &str, vocabulary: &[&str]) -> f64 {
    vocabulary
        .iter()
        .map(|w| score(text, w))
        .fold(0.0, f64::max)
}

fn score(text: &str, word: &str) -> f64 {
    if word.chars().count() > SHORT_WORD {
        return similarity(text, word);
    }
    if is_near_exact(text, word) {
        1.0
    } else {
        0.0
    }
}

fn is_near_exact(text: &str, word: &str) -> bool {
    if text == word || collapse_repeats(text) == word {
        return true;
    }
    let a: Vec<char> = text.chars().collect();
    let b: Vec<char> = word.chars().collect();
    if a.len() != b.len() {
        return false;
    }
    let diffs: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
    matches!(diffs.as_slice(), &[i, j] if j == i + 1 && a[i] == b[j] && a[j] == b[i])
}

fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !out.ends_with(c) {
            out.push(c);
        }
    }
    out
}

// Single letters only count on an exact hit, otherwise "a" would vote yes.
fn votes_for(token: &str, vocabulary: &[&str]) -> bool {
    if token.chars().count() < 2 {
        return vocabulary.contains(&token);
    }
    vocabulary
        .iter()
        .filter(|w| w.chars().count() >= 2)
        .any(|w| score(token, w) >= MATCH_THRESHOLD)
}
