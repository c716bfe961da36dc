/// Similarity in `[0, 1]`; a swapped pair of letters counts as one edit, so
/// "yse" still scores 0.67 against "yes".
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_damerau_levenshtein(a, b)
}

pub fn best_match<'a>(input: &str, candidates: &[&'a str], threshold: f64) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, similarity(input, c)))
        .filter(|(_, score)| *score >= threshold)
        .fold(None, |best: Option<(&'a str, f64)>, (c, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((c, score)),
        })
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("cash", "cash"), 1.0);
        assert!(similarity("cash", "paypal") < 0.3);
    }

    #[test]
    fn test_transposition_is_one_edit() {
        assert!(similarity("yse", "yes") > 0.65);
        assert!(similarity("confrim", "confirm") > 0.8);
    }

    #[test]
    fn test_best_match_prefers_highest() {
        let candidates = ["credit card", "debit card", "cash"];
        assert_eq!(best_match("debit crad", &candidates, 0.6), Some("debit card"));
        assert_eq!(best_match("bitcoin", &candidates, 0.6), None);
    }

    #[test]
    fn test_best_match_keeps_first_on_tie() {
        assert_eq!(best_match("ab", &["ax", "xb"], 0.5), Some("ax"));
    }
}
