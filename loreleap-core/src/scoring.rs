//! Word-score arithmetic for matched phrases.
//!
//! A phrase is worth the sum of its constituent words' scores; a category
//! is worth the sum of its matched phrases. Accumulation keeps full
//! precision — rounding happens only when a number reaches a display.

use crate::dictionary::WordScoreTable;

/// Sum of the phrase's words' scores. Unknown words contribute 0.
pub fn score_phrase(phrase: &str, scores: &WordScoreTable) -> f64 {
    phrase.split_whitespace().map(|word| scores.score(word)).sum()
}

/// Sum of the matched phrases' scores.
pub fn score_category<S: AsRef<str>>(phrases: &[S], scores: &WordScoreTable) -> f64 {
    phrases
        .iter()
        .map(|phrase| score_phrase(phrase.as_ref(), scores))
        .sum()
}

/// Display label for a phrase with its rounded point total, e.g.
/// `"silver fox (5 pts)"`.
pub fn phrase_score_display(phrase: &str, scores: &WordScoreTable) -> String {
    format!("{} ({} pts)", phrase, score_phrase(phrase, scores).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> WordScoreTable {
        WordScoreTable::from_entries([("silver", 2.0), ("fox", 3.0), ("raven", 6.5)]).unwrap()
    }

    #[test]
    fn test_phrase_score_is_additive() {
        assert_eq!(score_phrase("silver fox", &table()), 5.0);
    }

    #[test]
    fn test_unknown_words_score_zero() {
        assert_eq!(score_phrase("ancient silver fox", &table()), 5.0);
        assert_eq!(score_phrase("wolverine", &table()), 0.0);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(score_phrase("Silver FOX", &table()), 5.0);
    }

    #[test]
    fn test_category_score_sums_phrases() {
        let phrases = ["silver fox", "raven"];
        assert_eq!(score_category(&phrases, &table()), 11.5);
    }

    #[test]
    fn test_display_rounds_to_nearest_integer() {
        assert_eq!(phrase_score_display("raven", &table()), "raven (7 pts)");
        assert_eq!(
            phrase_score_display("silver fox", &table()),
            "silver fox (5 pts)"
        );
    }
}
