//! ExplorationSession - the primary public API for related-text play.
//!
//! Wraps the corpus, dictionaries, scoreboard and discovery tracking into
//! a single owned object, with nearest-neighbor retrieval delegated to an
//! external collaborator. The host hands the session a user's text
//! selection and gets back everything it needs to animate the round: the
//! next passage, matched categories, highlight spans, the score delta and
//! any metadata discoveries, each aggregated so one action fires one
//! celebration.
//!
//! A session moves through `Loading` (construction), `Ready`, and a
//! `Scoring` step per `select` call. Only the opening passage is special:
//! its categories and metadata are recorded but award nothing. All
//! mutation goes through `&mut self`, so a host that allows concurrent
//! user actions must serialize its calls.

use crate::corpus::{Corpus, MetadataTotals, Passage};
use crate::dictionary::{CategoryDictionary, WordScoreTable};
use crate::discovery::{DiscoveryBatch, DiscoveryProgress, DiscoveryTracker};
use crate::matcher::{find_categories, PhraseMatch};
use crate::overlap::{highlight_spans, SpanMatch};
use crate::scoreboard::{CategoryStanding, ScoreDelta, SessionScoreboard};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the retrieval collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RetrieverError(String);

impl RetrieverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A nearest-neighbor hit from the retrieval collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub passage_id: String,
    pub similarity: f64,
}

impl RetrievalHit {
    pub fn new(passage_id: impl Into<String>, similarity: f64) -> Self {
        Self {
            passage_id: passage_id.into(),
            similarity,
        }
    }
}

/// Nearest-neighbor search over the corpus embeddings.
///
/// Implementations own the embedding model and vector index; the session
/// only sees resolved hits. The query arrives already lowercased, the
/// same normalization the corpus embeddings were built with.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn related(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalHit>, RetrieverError>;
}

#[async_trait]
impl<T: Retriever + ?Sized> Retriever for Arc<T> {
    async fn related(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalHit>, RetrieverError> {
        (**self).related(query, top_k).await
    }
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrieverError),

    #[error("selection too short - select a longer word or phrase")]
    SelectionTooShort,

    #[error("no unseen passage among the {0} nearest neighbors")]
    NoFreshPassage(usize),

    #[error("unknown passage id {0:?}")]
    UnknownPassage(String),
}

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Configuration for a new exploration session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Nearest neighbors to request per selection.
    pub top_k: usize,
    /// Minimum character count for a single-word selection. Multi-word
    /// selections are always long enough.
    pub min_selection_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_selection_chars: 4,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many nearest neighbors to request per selection.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum character count for single-word selections.
    pub fn with_min_selection_chars(mut self, chars: usize) -> Self {
        self.min_selection_chars = chars;
        self
    }
}

/// The opening passage and its matches, before any scoring round.
#[derive(Debug, Clone)]
pub struct InitialView {
    pub passage: Passage,
    /// Categories matched in the opening passage.
    pub found: Vec<PhraseMatch>,
    /// Non-overlapping highlight spans for the opening passage.
    pub highlights: Vec<SpanMatch>,
}

/// Everything the host needs to render one scored round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// The retrieved passage, now current.
    pub passage: Passage,
    /// Similarity reported by the retriever for the chosen hit.
    pub similarity: f64,
    /// Categories matched in the user's selection.
    pub selected: Vec<PhraseMatch>,
    /// Categories matched in the retrieved passage.
    pub found: Vec<PhraseMatch>,
    /// Non-overlapping highlight spans for the passage text.
    pub highlights: Vec<SpanMatch>,
    /// Category points awarded by this round, aggregated per action.
    pub score_delta: ScoreDelta,
    /// Metadata discoveries from this round, batched into one
    /// celebration.
    pub discoveries: DiscoveryBatch,
    /// Standings after the round, ranked for display.
    pub standings: Vec<CategoryStanding>,
}

/// Point totals for the session so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_score: f64,
    pub category_points: f64,
    pub discovery_points: u32,
    /// Matched phrases credited across all categories.
    pub items_found: u64,
    pub authors_discovered: usize,
    pub books_discovered: usize,
    pub stories_discovered: usize,
}

/// An interactive related-text exploration session.
///
/// This is the main entry point. It manages:
/// - the current passage and which passages the session has visited
/// - phrase-category matching and scoring for every round
/// - discovery tracking and the cumulative scoreboard
pub struct ExplorationSession {
    id: SessionId,
    config: SessionConfig,
    dictionary: CategoryDictionary,
    word_scores: WordScoreTable,
    corpus: Corpus,
    retriever: Box<dyn Retriever>,
    scoreboard: SessionScoreboard,
    discoveries: DiscoveryTracker,
    metadata_totals: MetadataTotals,
    seen: HashSet<String>,
    current: Passage,
    initial: InitialView,
}

impl ExplorationSession {
    /// Create a session and perform the initial load.
    ///
    /// A random starting passage becomes current. Its categories are
    /// recorded on the scoreboard and its metadata counts toward
    /// discovery progress, but no celebration or discovery event is
    /// produced - the first passage a user sees never awards points.
    pub fn new(
        config: SessionConfig,
        dictionary: CategoryDictionary,
        word_scores: WordScoreTable,
        corpus: Corpus,
        retriever: Box<dyn Retriever>,
    ) -> Self {
        Self::with_rng(
            config,
            dictionary,
            word_scores,
            corpus,
            retriever,
            &mut rand::thread_rng(),
        )
    }

    /// Deterministic variant: the starting passage is drawn from `rng`.
    pub fn with_rng<R: Rng>(
        config: SessionConfig,
        dictionary: CategoryDictionary,
        word_scores: WordScoreTable,
        corpus: Corpus,
        retriever: Box<dyn Retriever>,
        rng: &mut R,
    ) -> Self {
        let start = corpus.random_passage_with_rng(rng).clone();
        Self::start_with(config, dictionary, word_scores, corpus, retriever, start)
    }

    /// Start from a specific passage instead of a random draw.
    pub fn with_starting_passage(
        config: SessionConfig,
        dictionary: CategoryDictionary,
        word_scores: WordScoreTable,
        corpus: Corpus,
        retriever: Box<dyn Retriever>,
        passage_id: &str,
    ) -> Result<Self, SessionError> {
        let start = corpus
            .get(passage_id)
            .ok_or_else(|| SessionError::UnknownPassage(passage_id.to_string()))?
            .clone();
        Ok(Self::start_with(
            config,
            dictionary,
            word_scores,
            corpus,
            retriever,
            start,
        ))
    }

    fn start_with(
        config: SessionConfig,
        dictionary: CategoryDictionary,
        word_scores: WordScoreTable,
        corpus: Corpus,
        retriever: Box<dyn Retriever>,
        start: Passage,
    ) -> Self {
        let metadata_totals = corpus.metadata_totals();
        let mut scoreboard = SessionScoreboard::for_dictionary(&dictionary);
        let mut discoveries = DiscoveryTracker::new();

        let found = find_categories(&start.text, &dictionary, &word_scores);
        // Recorded, delta discarded: the opening passage stays silent.
        scoreboard.apply_matches(&[], &found);
        discoveries.track_passage(&start, true);
        let highlights = highlight_spans(&start.text, &found, &dictionary);

        Self {
            id: SessionId::new(),
            config,
            dictionary,
            word_scores,
            corpus,
            retriever,
            scoreboard,
            discoveries,
            metadata_totals,
            seen: HashSet::new(),
            current: start.clone(),
            initial: InitialView {
                passage: start,
                found,
                highlights,
            },
        }
    }

    /// Run one scored round from a user's text selection.
    pub async fn select(&mut self, selection: &str) -> Result<RoundOutcome, SessionError> {
        let selection = selection.trim();
        if !self.is_valid_selection(selection) {
            return Err(SessionError::SelectionTooShort);
        }

        // The retriever embeds the lowercased selection, matching how the
        // corpus embeddings were built.
        let query = selection.to_lowercase();
        let hits = self.retriever.related(&query, self.config.top_k).await?;

        let (passage, similarity) = match self.choose_fresh(&hits, selection) {
            Some((passage, similarity)) => (passage.clone(), similarity),
            None => return Err(SessionError::NoFreshPassage(self.config.top_k)),
        };

        self.seen.insert(passage.id.clone());

        let selected = find_categories(selection, &self.dictionary, &self.word_scores);
        let found = find_categories(&passage.text, &self.dictionary, &self.word_scores);
        let score_delta = self.scoreboard.apply_matches(&selected, &found);
        let discoveries = self.discoveries.track_passage(&passage, false);
        let highlights = highlight_spans(&passage.text, &found, &self.dictionary);

        self.current = passage.clone();

        Ok(RoundOutcome {
            passage,
            similarity,
            selected,
            found,
            highlights,
            score_delta,
            discoveries,
            standings: self.scoreboard.ranked_categories(),
        })
    }

    /// First hit that brings genuinely new material: not the selection
    /// itself, not the current passage or its book, not a passage this
    /// session has already visited.
    fn choose_fresh(&self, hits: &[RetrievalHit], selection: &str) -> Option<(&Passage, f64)> {
        hits.iter().find_map(|hit| {
            let passage = self.corpus.get(&hit.passage_id)?;
            let fresh = passage.text != selection
                && passage.book != self.current.book
                && passage.text != self.current.text
                && !self.seen.contains(&passage.id);
            fresh.then_some((passage, hit.similarity))
        })
    }

    /// Whether a selection satisfies the minimum-size rule: more than one
    /// word, or at least `min_selection_chars` characters.
    pub fn is_valid_selection(&self, selection: &str) -> bool {
        let trimmed = selection.trim();
        trimmed.split_whitespace().count() > 1
            || trimmed.chars().count() >= self.config.min_selection_chars
    }

    /// The opening passage and its matches.
    pub fn initial_view(&self) -> &InitialView {
        &self.initial
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The passage currently on screen.
    pub fn current_passage(&self) -> &Passage {
        &self.current
    }

    pub fn scoreboard(&self) -> &SessionScoreboard {
        &self.scoreboard
    }

    pub fn discoveries(&self) -> &DiscoveryTracker {
        &self.discoveries
    }

    pub fn dictionary(&self) -> &CategoryDictionary {
        &self.dictionary
    }

    pub fn word_scores(&self) -> &WordScoreTable {
        &self.word_scores
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Unique metadata available in the corpus.
    pub fn metadata_totals(&self) -> MetadataTotals {
        self.metadata_totals
    }

    /// Passages visited through `select` this session.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Category points plus discovery points.
    pub fn total_score(&self) -> f64 {
        self.scoreboard.total_score(&self.discoveries)
    }

    /// Discovery progress against the corpus totals.
    pub fn progress(&self) -> DiscoveryProgress {
        self.discoveries.progress(&self.metadata_totals)
    }

    /// Point breakdown for the session so far.
    pub fn summary(&self) -> SessionSummary {
        use crate::discovery::DiscoveryKind;
        SessionSummary {
            total_score: self.total_score(),
            category_points: self.scoreboard.category_points(),
            discovery_points: self.discoveries.total_points(),
            items_found: self.scoreboard.items_found(),
            authors_discovered: self.discoveries.discovered(DiscoveryKind::Author),
            books_discovered: self.discoveries.discovered(DiscoveryKind::Book),
            stories_discovered: self.discoveries.discovered(DiscoveryKind::Story),
        }
    }
}
