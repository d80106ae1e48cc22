//! Testing utilities for the exploration engine.
//!
//! This module provides tools for integration testing:
//! - `MockRetriever` for deterministic tests without an embedding model
//! - `TestHarness` wiring a session to small sample resources
//! - Assertion helpers for verifying scoreboard state

use crate::corpus::{Corpus, Passage};
use crate::dictionary::{CategoryDictionary, WordScoreTable};
use crate::discovery::DiscoveryKind;
use crate::session::{
    ExplorationSession, RetrievalHit, Retriever, RetrieverError, RoundOutcome, SessionConfig,
    SessionError,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A mock retriever that returns scripted hit lists in order.
///
/// Once the script runs out, every further query gets an empty hit list,
/// which surfaces as `SessionError::NoFreshPassage`.
pub struct MockRetriever {
    script: Mutex<Script>,
}

struct Script {
    responses: Vec<Vec<RetrievalHit>>,
    index: usize,
}

impl MockRetriever {
    /// Create a mock retriever with scripted responses.
    pub fn new(responses: Vec<Vec<RetrievalHit>>) -> Self {
        Self {
            script: Mutex::new(Script {
                responses,
                index: 0,
            }),
        }
    }

    /// Hits for the given passage ids, with descending similarity.
    pub fn hits(ids: &[&str]) -> Vec<RetrievalHit> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| RetrievalHit::new(*id, 0.95 - 0.05 * i as f64))
            .collect()
    }

    /// Add a response to the queue.
    pub fn queue_response(&self, hits: Vec<RetrievalHit>) {
        let mut script = self.script.lock().expect("mock retriever script lock");
        script.responses.push(hits);
    }

    /// Reset the response index to replay from the beginning.
    pub fn reset(&self) {
        let mut script = self.script.lock().expect("mock retriever script lock");
        script.index = 0;
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn related(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> Result<Vec<RetrievalHit>, RetrieverError> {
        let mut script = self.script.lock().expect("mock retriever script lock");
        if script.index < script.responses.len() {
            let hits = script.responses[script.index].clone();
            script.index += 1;
            Ok(hits)
        } else {
            Ok(Vec::new())
        }
    }
}

/// A retriever that always fails, for exercising error paths.
pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn related(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> Result<Vec<RetrievalHit>, RetrieverError> {
        Err(RetrieverError::new("retriever offline"))
    }
}

/// Small folklore dictionary used by the harness.
pub fn sample_dictionary() -> CategoryDictionary {
    CategoryDictionary::from_entries([
        ("animals", vec!["fox", "silver fox", "wolf", "raven"]),
        ("myth", vec!["giant", "fairy", "dragon"]),
        ("nature", vec!["forest", "mountain", "river"]),
        ("adventure", vec!["journey", "quest"]),
    ])
    .expect("sample dictionary is well formed")
}

/// Word scores matching [`sample_dictionary`].
pub fn sample_word_scores() -> WordScoreTable {
    WordScoreTable::from_entries([
        ("fox", 3.0),
        ("silver", 2.0),
        ("wolf", 4.0),
        ("raven", 6.0),
        ("giant", 5.0),
        ("fairy", 7.0),
        ("dragon", 9.0),
        ("forest", 2.0),
        ("mountain", 3.0),
        ("river", 2.0),
        ("journey", 4.0),
        ("quest", 8.0),
    ])
    .expect("sample scores are well formed")
}

fn sample_passage(
    id: &str,
    book: &str,
    text: &str,
    author: &str,
    title: &str,
    story_title: &str,
) -> Passage {
    Passage {
        id: id.to_string(),
        book: book.to_string(),
        text: text.to_string(),
        author: author.to_string(),
        title: title.to_string(),
        story_title: story_title.to_string(),
        embedding: None,
    }
}

/// Six-passage corpus used by the harness. Passage `p6` matches no
/// curated phrase; `p5` shares a book with `p2`.
pub fn sample_corpus() -> Corpus {
    Corpus::new(vec![
        sample_passage(
            "p1",
            "PG1001",
            "A silver fox slipped through the quiet forest at dusk.",
            "Donald Mackenzie",
            "Elves and Heroes",
            "The Silver Fox",
        ),
        sample_passage(
            "p2",
            "PG1002",
            "The giant strode over the mountain while a raven watched.",
            "Joseph Jacobs",
            "Celtic Fairy Tales",
            "The Giant",
        ),
        sample_passage(
            "p3",
            "PG1003",
            "A fairy led the wolf across the river by moonlight.",
            "None",
            "Norse Wonder Tales",
            "None",
        ),
        sample_passage(
            "p4",
            "PG1004",
            "Their quest began with a long journey into the north.",
            "Andrew Lang",
            "The Blue Fairy Book",
            "The Long Journey",
        ),
        sample_passage(
            "p5",
            "PG1002",
            "A dragon slept beneath the mountain of the old king.",
            "Joseph Jacobs",
            "Celtic Fairy Tales",
            "The Dragon",
        ),
        sample_passage(
            "p6",
            "PG1005",
            "No curated words appear in this plain passage.",
            "Anonymous",
            "Plain Tales",
            "",
        ),
    ])
    .expect("sample corpus is well formed")
}

/// Test harness for running exploration scenarios.
pub struct TestHarness {
    /// Shared handle to the mock retriever, for queueing more hits.
    pub retriever: Arc<MockRetriever>,
    /// The session under test.
    pub session: ExplorationSession,
}

impl TestHarness {
    /// Harness over the sample resources, starting from passage `p6` (no
    /// curated matches, so the opening round credits nothing).
    pub fn new() -> Self {
        Self::starting_from("p6", Vec::new())
    }

    /// Harness starting from a specific sample passage with a scripted
    /// set of retriever responses.
    pub fn starting_from(passage_id: &str, responses: Vec<Vec<RetrievalHit>>) -> Self {
        let retriever = Arc::new(MockRetriever::new(responses));
        let session = ExplorationSession::with_starting_passage(
            SessionConfig::default(),
            sample_dictionary(),
            sample_word_scores(),
            sample_corpus(),
            Box::new(retriever.clone()),
            passage_id,
        )
        .expect("sample passage id exists");
        Self { retriever, session }
    }

    /// Queue a retriever response hitting the given passage ids.
    pub fn expect_hits(&mut self, ids: &[&str]) -> &mut Self {
        self.retriever.queue_response(MockRetriever::hits(ids));
        self
    }

    /// Run one round from a selection.
    pub async fn select(&mut self, text: &str) -> Result<RoundOutcome, SessionError> {
        self.session.select(text).await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert a category's cumulative phrase count.
#[track_caller]
pub fn assert_category_count(session: &ExplorationSession, category: &str, count: u64) {
    let actual = session
        .scoreboard()
        .category(category)
        .map(|t| t.count)
        .unwrap_or(0);
    assert_eq!(
        actual, count,
        "expected category {category:?} count {count}, got {actual}"
    );
}

/// Assert a category's cumulative score, within floating-point noise.
#[track_caller]
pub fn assert_category_score(session: &ExplorationSession, category: &str, score: f64) {
    let actual = session
        .scoreboard()
        .category(category)
        .map(|t| t.score)
        .unwrap_or(0.0);
    assert!(
        (actual - score).abs() < 1e-9,
        "expected category {category:?} score {score}, got {actual}"
    );
}

/// Assert the session's combined total score.
#[track_caller]
pub fn assert_total_score(session: &ExplorationSession, score: f64) {
    let actual = session.total_score();
    assert!(
        (actual - score).abs() < 1e-9,
        "expected total score {score}, got {actual}"
    );
}

/// Assert how many values of a kind have been discovered.
#[track_caller]
pub fn assert_discovered(session: &ExplorationSession, kind: DiscoveryKind, count: usize) {
    let actual = session.discoveries().discovered(kind);
    assert_eq!(
        actual, count,
        "expected {count} discovered {}s, got {actual}",
        kind.name()
    );
}
