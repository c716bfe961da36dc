use std::fmt;

use super::fuzzy::{best_match, similarity};
use super::normalize;

const FUZZY_THRESHOLD: f64 = 0.6;
const MAX_FREE_TEXT_CHARS: usize = 40;

const SKIP: &[&str] = &[
    "skip", "later", "pay later", "decide later", "none", "no", "not now", "not sure", "n/a",
    "na",
];

const KNOWN: &[&str] = &["credit card", "debit card", "cash", "paypal"];

const CARD_BRANDS: &[&str] = &["visa", "mastercard", "master card", "amex", "american express"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Cash,
    PayPal,
    NotSpecified,
    Other(String),
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard => f.write_str("Credit Card"),
            PaymentMethod::DebitCard => f.write_str("Debit Card"),
            PaymentMethod::Cash => f.write_str("Cash"),
            PaymentMethod::PayPal => f.write_str("PayPal"),
            PaymentMethod::NotSpecified => f.write_str("Not specified"),
            PaymentMethod::Other(s) => f.write_str(s),
        }
    }
}

/// Payment is optional, so every non-empty answer is accepted: recognised
/// methods are canonicalised and anything else is kept as typed.
pub fn parse_payment_method(text: &str) -> Option<PaymentMethod> {
    let text = normalize(text);
    let text = text.trim_matches(|c: char| c.is_ascii_punctuation() && c != '/');
    if text.is_empty() {
        return None;
    }

    if SKIP.contains(&text) {
        return Some(PaymentMethod::NotSpecified);
    }

    if text.contains("debit") {
        return Some(PaymentMethod::DebitCard);
    }
    if text.contains("credit") || CARD_BRANDS.iter().any(|b| text.contains(b)) {
        return Some(PaymentMethod::CreditCard);
    }
    if text.contains("paypal") || text.contains("pay pal") {
        return Some(PaymentMethod::PayPal);
    }
    if text.split_whitespace().any(|w| w == "cash") {
        return Some(PaymentMethod::Cash);
    }

    let fuzzy = best_match(text, KNOWN, FUZZY_THRESHOLD)
        .filter(|m| similarity(text, m) > FUZZY_THRESHOLD);
    match fuzzy {
        Some("credit card") => Some(PaymentMethod::CreditCard),
        Some("debit card") => Some(PaymentMethod::DebitCard),
        Some("cash") => Some(PaymentMethod::Cash),
        Some("paypal") => Some(PaymentMethod::PayPal),
        _ => Some(PaymentMethod::Other(title_case(text))),
    }
}

fn title_case(text: &str) -> String {
    text.chars()
        .take(MAX_FREE_TEXT_CHARS)
        .collect::<String>()
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
