//! Phrase-category matching.
//!
//! Scans a text block against every category's phrase list and reports,
//! per category, the phrases that occur as whole words after overlap
//! filtering, together with the category's point total.

use crate::dictionary::{CategoryDictionary, PhrasePattern, WordScoreTable};
use crate::overlap::resolve_phrases;
use crate::scoring::score_category;
use serde::{Deserialize, Serialize};

/// Matched phrases and point total for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseMatch {
    /// Category name as it appears in the dictionary.
    pub category: String,
    /// Matched phrases, longest first, deduplicated. Never empty.
    pub phrases: Vec<String>,
    /// Point total for the matched phrases.
    pub score: f64,
}

/// Find every category with at least one whole-word phrase occurrence in
/// `text`.
///
/// Matching is case-insensitive and phrases are literal patterns. A
/// category contributes only when at least one of its phrases survives
/// overlap filtering, so no returned match has an empty phrase list.
/// Result order follows the dictionary's insertion order. Pure function
/// of its inputs.
pub fn find_categories(
    text: &str,
    dictionary: &CategoryDictionary,
    scores: &WordScoreTable,
) -> Vec<PhraseMatch> {
    let mut matches = Vec::new();
    for category in dictionary.categories() {
        let candidates: Vec<&PhrasePattern> = category
            .phrases()
            .iter()
            .filter(|p| p.is_match(text))
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let kept = resolve_phrases(&candidates, text);
        if kept.is_empty() {
            continue;
        }

        let phrases: Vec<String> = kept.iter().map(|p| p.text().to_string()).collect();
        let score = score_category(&phrases, scores);
        matches.push(PhraseMatch {
            category: category.name().to_string(),
            phrases,
            score,
        });
    }
    matches
}
