//! Cumulative per-category scores for a session.
//!
//! Counts, scores and matched-phrase sets only ever grow; the board
//! resets only when a new session is constructed. `apply_matches` is
//! deliberately not idempotent — each call is a one-time user action, and
//! replaying the same matches credits them again.

use crate::dictionary::CategoryDictionary;
use crate::discovery::DiscoveryTracker;
use crate::matcher::PhraseMatch;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Cumulative totals for one category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryTotals {
    /// Number of matched phrases credited to the category.
    pub count: u64,
    /// Point total credited to the category.
    pub score: f64,
    /// Every phrase ever matched for the category, lowercased.
    phrases: BTreeSet<String>,
}

impl CategoryTotals {
    /// All-time matched phrases, sorted for display.
    pub fn matched_phrases(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }
}

/// One row of the ranked category standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStanding {
    pub category: String,
    pub count: u64,
    pub score: f64,
}

/// Score awarded by a single `apply_matches` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta {
    /// Per-category awards, in first-credited order.
    pub per_category: Vec<(String, f64)>,
    /// Sum of the per-category awards; drives the single aggregate
    /// celebration for the action.
    pub total: f64,
}

impl ScoreDelta {
    /// Whether the delta is big enough to announce. Residual fractions of
    /// a point are recorded but stay quiet.
    pub fn is_celebratory(&self) -> bool {
        self.total > 1.0
    }
}

/// Cumulative category scores, counts and matched phrases.
#[derive(Debug, Clone, Default)]
pub struct SessionScoreboard {
    totals: HashMap<String, CategoryTotals>,
}

impl SessionScoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scoreboard pre-seeded with a zero entry per dictionary category,
    /// so standings always list every bucket.
    pub fn for_dictionary(dictionary: &CategoryDictionary) -> Self {
        let totals = dictionary
            .category_names()
            .map(|name| (name.to_string(), CategoryTotals::default()))
            .collect();
        Self { totals }
    }

    /// Credit matched phrases from one user action.
    ///
    /// Both the selection's matches and the retrieved passage's matches
    /// score. Each category's count grows by its matched-phrase count,
    /// its score by the match score, and its all-time phrase set absorbs
    /// the lowercased phrases. The returned delta sums every award from
    /// this call so the host can fire one celebration.
    pub fn apply_matches(
        &mut self,
        selected: &[PhraseMatch],
        found: &[PhraseMatch],
    ) -> ScoreDelta {
        let mut delta = ScoreDelta::default();
        for m in selected.iter().chain(found.iter()) {
            let entry = self.totals.entry(m.category.clone()).or_default();
            entry.count += m.phrases.len() as u64;
            entry.score += m.score;
            for phrase in &m.phrases {
                entry.phrases.insert(phrase.to_lowercase());
            }

            match delta.per_category.iter_mut().find(|(c, _)| *c == m.category) {
                Some((_, award)) => *award += m.score,
                None => delta.per_category.push((m.category.clone(), m.score)),
            }
        }
        delta.total = delta.per_category.iter().map(|(_, award)| award).sum();
        delta
    }

    /// Totals for one category, if it has ever been seen or seeded.
    pub fn category(&self, name: &str) -> Option<&CategoryTotals> {
        self.totals.get(name)
    }

    /// Sum of category points across the board.
    pub fn category_points(&self) -> f64 {
        self.totals.values().map(|t| t.score).sum()
    }

    /// Total matched phrases across all categories.
    pub fn items_found(&self) -> u64 {
        self.totals.values().map(|t| t.count).sum()
    }

    /// Category points plus discovery points.
    pub fn total_score(&self, discoveries: &DiscoveryTracker) -> f64 {
        self.category_points() + f64::from(discoveries.total_points())
    }

    /// Standings ordered by score (desc), then count (desc), then
    /// category name (asc). Recompute after every score change.
    pub fn ranked_categories(&self) -> Vec<CategoryStanding> {
        let mut rows: Vec<CategoryStanding> = self
            .totals
            .iter()
            .map(|(category, totals)| CategoryStanding {
                category: category.clone(),
                count: totals.count,
                score: totals.score,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.category.cmp(&b.category))
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase_match(category: &str, phrases: &[&str], score: f64) -> PhraseMatch {
        PhraseMatch {
            category: category.to_string(),
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            score,
        }
    }

    #[test]
    fn test_apply_credits_selected_and_found() {
        let mut board = SessionScoreboard::new();
        let delta = board.apply_matches(
            &[phrase_match("animals", &["fox"], 3.0)],
            &[phrase_match("animals", &["wolf"], 4.0)],
        );
        assert_eq!(delta.total, 7.0);
        assert_eq!(delta.per_category, vec![("animals".to_string(), 7.0)]);

        let totals = board.category("animals").unwrap();
        assert_eq!(totals.count, 2);
        assert_eq!(totals.score, 7.0);
    }

    #[test]
    fn test_delta_total_sums_categories() {
        let mut board = SessionScoreboard::new();
        let delta = board.apply_matches(
            &[],
            &[
                phrase_match("animals", &["fox"], 3.0),
                phrase_match("myth", &["giant"], 5.0),
            ],
        );
        assert_eq!(delta.per_category.len(), 2);
        assert_eq!(delta.total, 8.0);
    }

    #[test]
    fn test_double_apply_double_counts_by_design() {
        let mut board = SessionScoreboard::new();
        let matches = [phrase_match("animals", &["fox"], 3.0)];
        board.apply_matches(&matches, &[]);
        board.apply_matches(&matches, &[]);
        let totals = board.category("animals").unwrap();
        assert_eq!(totals.count, 2);
        assert_eq!(totals.score, 6.0);
    }

    #[test]
    fn test_counts_and_scores_never_decrease() {
        let mut board = SessionScoreboard::new();
        let mut last = (0u64, 0.0f64);
        let rounds = [
            vec![phrase_match("animals", &["fox"], 3.0)],
            vec![],
            vec![phrase_match("animals", &["silver fox", "fox"], 8.0)],
        ];
        for round in &rounds {
            board.apply_matches(&[], round);
            let totals = board.category("animals").cloned().unwrap_or_default();
            assert!(totals.count >= last.0);
            assert!(totals.score >= last.1);
            last = (totals.count, totals.score);
        }
    }

    #[test]
    fn test_matched_phrases_accumulate_lowercased() {
        let mut board = SessionScoreboard::new();
        board.apply_matches(&[phrase_match("animals", &["Silver Fox"], 5.0)], &[]);
        board.apply_matches(&[phrase_match("animals", &["silver fox", "wolf"], 9.0)], &[]);
        let phrases: Vec<_> = board
            .category("animals")
            .unwrap()
            .matched_phrases()
            .collect();
        assert_eq!(phrases, vec!["silver fox", "wolf"]);
    }

    #[test]
    fn test_ranking_order() {
        let mut board = SessionScoreboard::new();
        board.apply_matches(
            &[],
            &[
                phrase_match("adventure", &["quest", "journey"], 10.0),
                phrase_match("animal", ["fox"; 9].as_slice(), 5.0),
            ],
        );
        board.apply_matches(
            &[],
            &[phrase_match("myth", &["giant", "fairy", "dragon"], 10.0)],
        );

        let ranked = board.ranked_categories();
        let names: Vec<_> = ranked.iter().map(|r| r.category.as_str()).collect();
        // Score tie between myth (count 3) and adventure (count 2) goes to
        // the higher count; animal trails on score despite its count.
        assert_eq!(names, vec!["myth", "adventure", "animal"]);
    }

    #[test]
    fn test_name_breaks_remaining_ties() {
        let mut board = SessionScoreboard::new();
        board.apply_matches(
            &[],
            &[
                phrase_match("weather", &["storm"], 4.0),
                phrase_match("nature", &["river"], 4.0),
            ],
        );
        let names: Vec<_> = board
            .ranked_categories()
            .iter()
            .map(|r| r.category.clone())
            .collect();
        assert_eq!(names, vec!["nature", "weather"]);
    }

    #[test]
    fn test_seeded_board_lists_every_bucket() {
        let dictionary = CategoryDictionary::from_entries([
            ("animals", vec!["fox"]),
            ("myth", vec!["giant"]),
        ])
        .unwrap();
        let board = SessionScoreboard::for_dictionary(&dictionary);
        let ranked = board.ranked_categories();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.score == 0.0 && r.count == 0));
        // Zero rows fall back to name order.
        assert_eq!(ranked[0].category, "animals");
    }

    #[test]
    fn test_total_score_includes_discoveries() {
        let mut board = SessionScoreboard::new();
        board.apply_matches(&[], &[phrase_match("animals", &["fox"], 3.0)]);

        let mut discoveries = DiscoveryTracker::new();
        discoveries.track_item(crate::discovery::DiscoveryKind::Author, "A", false);

        assert_eq!(board.category_points(), 3.0);
        assert_eq!(board.total_score(&discoveries), 10.0);
    }
}
