use once_cell::sync::Lazy;
use regex::Regex;

const MAX_NAME_WORDS: usize = 3;

// Phrases after which the rest of the clause is the name.
static INTRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:my\s+name\s+is|my\s+name's|name's|name\s+is|call\s+me|i\s+am|i'm|i’m|im|this\s+is|it's|it\s+is)\s+([^,.;!?]+)",
    )
    .expect("intro pattern is valid")
});

// Capitalised words that are never a name on their own.
const NOT_NAMES: &[&str] = &[
    "a", "an", "and", "the", "i", "me", "my", "mine", "you", "we", "us", "hi", "hello", "hey",
    "hiya", "howdy", "greetings", "yo", "good", "morning", "afternoon", "evening", "day", "sir",
    "madam", "mr", "mrs", "ms", "miss", "dr", "thanks", "thank", "please", "ok", "okay", "yes",
    "no", "here", "there", "just", "not", "so", "very", "fine", "great", "ready", "back",
    "sorry", "new", "glad", "happy", "looking", "going", "interested", "trying", "hoping",
    "staying", "booking", "planning", "calling", "wondering", "checking", "traveling",
    "travelling", "wanting", "want", "need", "would", "like", "book", "room", "hotel", "stay",
    "reservation", "to", "for", "with", "from", "in", "on", "at", "is", "name", "what", "who",
    "can", "could", "there's", "it", "this", "that", "today", "tonight", "tomorrow", "yesterday",
    "cancel", "confirm", "restart", "i'm", "i'd", "i'll", "i've", "it's", "that's", "we're",
];

pub fn extract_name(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    from_introduction(text)
        .or_else(|| from_capitalised_run(text))
        .or_else(|| from_short_reply(text))
        .filter(|name| !name.trim().is_empty())
}

fn from_introduction(text: &str) -> Option<String> {
    let captures = INTRO.captures(text)?;
    let tail = captures.get(1)?.as_str();

    let parts: Vec<&str> = tail
        .split_whitespace()
        .take_while(|w| is_name_like(w) && !is_filler(w))
        .take(MAX_NAME_WORDS)
        .collect();

    join_name(&parts)
}

fn from_capitalised_run(text: &str) -> Option<String> {
    let mut run: Vec<&str> = Vec::new();

    for raw in text.split_whitespace() {
        let word = trim_punctuation(raw);
        let candidate = is_name_like(word)
            && word.chars().next().is_some_and(char::is_uppercase)
            && word.chars().count() > 1
            && !is_filler(word);

        if candidate {
            run.push(word);
            if run.len() == MAX_NAME_WORDS {
                break;
            }
        } else if !run.is_empty() {
            break;
        }

        // Clause punctuation ends any run in progress.
        if !run.is_empty() && raw.ends_with([',', '.', '!', '?', ';', ':']) {
            break;
        }
    }

    join_name(&run)
}

fn from_short_reply(text: &str) -> Option<String> {
    let parts: Vec<&str> = text.split_whitespace().map(trim_punctuation).collect();
    if parts.is_empty() || parts.len() > MAX_NAME_WORDS {
        return None;
    }
    if parts
        .iter()
        .any(|w| !is_name_like(w) || is_filler(w) || w.chars().count() < 2)
    {
        return None;
    }
    join_name(&parts)
}

fn trim_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphabetic() && c != '\'' && c != '-')
        .trim_matches(|c: char| c == '\'' || c == '-')
}

fn is_name_like(word: &str) -> bool {
    let word = trim_punctuation(word);
    !word.is_empty()
        && word.chars().any(char::is_alphabetic)
        && word
            .chars()
            .all(|c| c.is_alphabetic() || c == '\'' || c == '-')
}

fn is_filler(word: &str) -> bool {
    let lower = trim_punctuation(word).to_lowercase().replace('’', "'");
    // Any "I'<x>" contraction, however it is spelled.
    NOT_NAMES.contains(&lower.as_str()) || lower.starts_with("i'")
}

fn join_name(parts: &[&str]) -> Option<String> {
    if parts.is_empty() {
        return None;
    }
    let name = parts
        .iter()
        .map(|w| capitalise(trim_punctuation(w)))
        .collect::<Vec<_>>()
        .join(" ");
    Some(name)
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
