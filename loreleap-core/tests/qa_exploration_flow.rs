//! QA tests for full exploration session flow.
//!
//! These tests drive `ExplorationSession` end to end against the mock
//! retriever: opening-passage suppression, scored rounds, discovery
//! batching, freshness filtering and error paths.
//!
//! Run with: `cargo test -p loreleap-core --test qa_exploration_flow`

use loreleap_core::testing::{
    assert_category_count, assert_category_score, assert_discovered, assert_total_score,
    sample_corpus, sample_dictionary, sample_word_scores, MockRetriever, TestHarness,
};
use loreleap_core::{
    DiscoveryKind, ExplorationSession, RetrievalHit, SessionConfig, SessionError,
};

// =============================================================================
// INITIAL LOAD
// =============================================================================

#[test]
fn test_initial_load_records_without_awarding() {
    // p1 matches animals ("silver fox") and nature ("forest").
    let harness = TestHarness::starting_from("p1", Vec::new());
    let session = &harness.session;

    let initial = session.initial_view();
    assert_eq!(initial.passage.id, "p1");
    assert_eq!(initial.found.len(), 2);
    assert!(!initial.highlights.is_empty());

    // Categories are recorded on the board...
    assert_category_count(session, "animals", 1);
    assert_category_score(session, "animals", 5.0);
    assert_category_count(session, "nature", 1);

    // ...and metadata counts toward progress, but nothing was celebrated:
    // discovery points exist on the board only as recorded totals.
    assert_discovered(session, DiscoveryKind::Author, 1);
    assert_discovered(session, DiscoveryKind::Book, 1);
    assert_discovered(session, DiscoveryKind::Story, 1);
    assert_eq!(session.summary().discovery_points, 15);
}

#[test]
fn test_initial_passage_with_no_matches_scores_nothing() {
    let harness = TestHarness::new(); // starts from p6
    let session = &harness.session;

    assert!(session.initial_view().found.is_empty());
    assert_eq!(session.scoreboard().category_points(), 0.0);
    assert_eq!(session.scoreboard().items_found(), 0);
    // p6 still reveals an author and a book (its story title is blank).
    assert_eq!(session.summary().discovery_points, 12);
}

// =============================================================================
// SCORED ROUNDS
// =============================================================================

#[tokio::test]
async fn test_round_scores_selection_and_passage() {
    let mut harness = TestHarness::new();
    harness.expect_hits(&["p2"]);

    // Selection matches nature ("forest"); p2 matches animals ("raven"),
    // myth ("giant") and nature ("mountain").
    let round = harness.select("deep in the forest").await.unwrap();

    assert_eq!(round.passage.id, "p2");
    assert_eq!(round.selected.len(), 1);
    assert_eq!(round.found.len(), 3);

    // forest 2 + raven 6 + giant 5 + mountain 3
    assert!((round.score_delta.total - 16.0).abs() < 1e-9);
    assert!(round.score_delta.is_celebratory());

    assert_category_score(&harness.session, "nature", 5.0);
    assert_category_score(&harness.session, "animals", 6.0);
    assert_category_score(&harness.session, "myth", 5.0);
}

#[tokio::test]
async fn test_discoveries_batch_into_one_celebration() {
    let mut harness = TestHarness::new(); // p6: Anonymous / Plain Tales seen
    harness.expect_hits(&["p2"]);

    let round = harness.select("old stories").await.unwrap();

    // p2 reveals a new author (7), book (5) and story (3) in one action.
    assert_eq!(round.discoveries.len(), 3);
    assert_eq!(round.discoveries.total_points(), 15);

    // Hop through a different book first; p5 shares p2's book and would
    // be filtered as a same-book neighbor.
    harness.expect_hits(&["p4"]);
    harness.select("a long journey").await.unwrap();

    // p5's author and book are already known; only its story is new.
    harness.expect_hits(&["p5"]);
    let round = harness.select("the mountain king").await.unwrap();
    assert_eq!(round.discoveries.len(), 1);
    assert_eq!(round.discoveries.total_points(), 3);
}

#[tokio::test]
async fn test_placeholder_metadata_is_not_discovered() {
    let mut harness = TestHarness::new();
    harness.expect_hits(&["p3"]); // author "None", story "None"

    let round = harness.select("across the river").await.unwrap();
    let kinds: Vec<_> = round.discoveries.events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![DiscoveryKind::Book]);
}

#[tokio::test]
async fn test_standings_update_with_rounds() {
    let mut harness = TestHarness::new();
    harness.expect_hits(&["p2"]);

    let round = harness.select("a raven in a tree").await.unwrap();
    let top = &round.standings[0];
    // raven (selection) + raven (passage) = 12 beats giant = 5.
    assert_eq!(top.category, "animals");
    assert_eq!(top.count, 2);

    // Every dictionary category stays listed, even at zero.
    assert_eq!(round.standings.len(), 4);
}

#[tokio::test]
async fn test_total_score_combines_categories_and_discoveries() {
    let mut harness = TestHarness::new();
    harness.expect_hits(&["p4"]);

    harness.select("a long journey").await.unwrap();

    let summary = harness.session.summary();
    // Selection: journey 4. Passage: quest 8 + journey 4.
    assert!((summary.category_points - 16.0).abs() < 1e-9);
    // p6 (initial: author+book) + p4 (author+book+story).
    assert_eq!(summary.discovery_points, 12 + 15);
    assert_total_score(&harness.session, 16.0 + 27.0);
}

// =============================================================================
// FRESHNESS FILTERING
// =============================================================================

#[tokio::test]
async fn test_hits_from_current_book_are_skipped() {
    // Start on p2 (book PG1002); p5 shares that book.
    let mut harness = TestHarness::starting_from("p2", Vec::new());
    harness.expect_hits(&["p5", "p4"]);

    let round = harness.select("the old king").await.unwrap();
    assert_eq!(round.passage.id, "p4");
}

#[tokio::test]
async fn test_already_seen_passages_are_skipped() {
    let mut harness = TestHarness::new();
    harness.expect_hits(&["p1"]);
    harness.expect_hits(&["p1", "p3"]);

    assert_eq!(harness.select("first leap").await.unwrap().passage.id, "p1");
    // p1 was visited, so the second round falls through to p3.
    assert_eq!(harness.select("second leap").await.unwrap().passage.id, "p3");
    assert_eq!(harness.session.seen_count(), 2);
}

#[tokio::test]
async fn test_all_hits_filtered_is_no_fresh_passage() {
    let mut harness = TestHarness::new();
    harness.expect_hits(&["p1"]);
    harness.expect_hits(&["p1"]); // only the passage just visited

    harness.select("first leap").await.unwrap();
    let err = harness.select("second leap").await.unwrap_err();
    assert!(matches!(err, SessionError::NoFreshPassage(_)));
}

#[tokio::test]
async fn test_exhausted_script_is_no_fresh_passage() {
    let mut harness = TestHarness::new();
    let err = harness.select("anything at all").await.unwrap_err();
    assert!(matches!(err, SessionError::NoFreshPassage(_)));
}

#[tokio::test]
async fn test_unknown_hit_ids_are_skipped() {
    let mut harness = TestHarness::new();
    harness
        .retriever
        .queue_response(vec![
            RetrievalHit::new("ghost", 0.99),
            RetrievalHit::new("p1", 0.9),
        ]);

    let round = harness.select("the silver fox").await.unwrap();
    assert_eq!(round.passage.id, "p1");
    assert!((round.similarity - 0.9).abs() < 1e-9);
}

// =============================================================================
// SELECTION VALIDATION
// =============================================================================

#[tokio::test]
async fn test_short_selection_rejected() {
    let mut harness = TestHarness::new();
    for selection in ["", "ox", "  a  "] {
        let err = harness.select(selection).await.unwrap_err();
        assert!(matches!(err, SessionError::SelectionTooShort));
    }
}

#[tokio::test]
async fn test_selection_rules_match_original_thresholds() {
    let harness = TestHarness::new();
    let session = &harness.session;

    // Multi-word selections are always valid.
    assert!(session.is_valid_selection("an ox"));
    // Single words need four characters.
    assert!(session.is_valid_selection("wolf"));
    assert!(!session.is_valid_selection("owl"));
}

#[tokio::test]
async fn test_custom_selection_threshold() {
    let session = ExplorationSession::with_starting_passage(
        SessionConfig::new().with_min_selection_chars(8),
        sample_dictionary(),
        sample_word_scores(),
        sample_corpus(),
        Box::new(MockRetriever::new(Vec::new())),
        "p6",
    )
    .unwrap();

    assert!(!session.is_valid_selection("journey"));
    assert!(session.is_valid_selection("journeys"));
    assert!(session.is_valid_selection("a journey"));
}

// =============================================================================
// PROGRESS
// =============================================================================

#[tokio::test]
async fn test_progress_percentages_track_corpus_totals() {
    // Sample corpus totals: 4 authors, 5 books, 4 stories.
    let mut harness = TestHarness::new(); // p6 discovers 1 author + 1 book
    let progress = harness.session.progress();
    assert_eq!(progress.authors, 25);
    assert_eq!(progress.books, 20);
    assert_eq!(progress.stories, 0);

    harness.expect_hits(&["p2"]);
    harness.select("over the mountain").await.unwrap();
    let progress = harness.session.progress();
    assert_eq!(progress.authors, 50);
    assert_eq!(progress.books, 40);
    assert_eq!(progress.stories, 25);
}
