//! Phrase-category matching and scoring engine for an interactive
//! "find related text" exploration game.
//!
//! A user selects a phrase in a displayed passage; the host embeds the
//! selection, retrieves a semantically similar passage from a fixed
//! corpus, and animates the transition. This crate is everything in
//! between: it matches curated category phrases in both texts, resolves
//! overlapping occurrences, scores them from a word-score table, tracks
//! first sightings of authors, books and stories, and keeps the
//! cumulative session scoreboard. Rendering, animation and the vector
//! index stay outside, behind the [`Retriever`] trait.
//!
//! # Quick Start
//!
//! ```ignore
//! use loreleap_core::{
//!     CategoryDictionary, Corpus, ExplorationSession, SessionConfig, WordScoreTable,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dictionary = CategoryDictionary::load("site-data/category-words.json").await?;
//!     let scores = WordScoreTable::load("site-data/scores_lookup.json").await?;
//!     let corpus = Corpus::load("site-data/passages.json").await?;
//!
//!     let mut session = ExplorationSession::new(
//!         SessionConfig::default(),
//!         dictionary,
//!         scores,
//!         corpus,
//!         Box::new(my_retriever),
//!     );
//!
//!     let round = session.select("the old mysterious forest").await?;
//!     println!("+{} pts", round.score_delta.total.round());
//!     Ok(())
//! }
//! ```

pub mod corpus;
pub mod dictionary;
pub mod discovery;
pub mod matcher;
pub mod overlap;
pub mod scoreboard;
pub mod scoring;
pub mod session;
pub mod testing;

// Primary public API
pub use corpus::{Corpus, CorpusError, MetadataTotals, Passage};
pub use dictionary::{CategoryDictionary, DictionaryError, WordScoreTable};
pub use discovery::{
    DiscoveryBatch, DiscoveryEvent, DiscoveryKind, DiscoveryProgress, DiscoveryTracker,
};
pub use matcher::{find_categories, PhraseMatch};
pub use overlap::{highlight_spans, resolve_spans, SpanMatch};
pub use scoreboard::{CategoryStanding, ScoreDelta, SessionScoreboard};
pub use scoring::{phrase_score_display, score_category, score_phrase};
pub use session::{
    ExplorationSession, InitialView, RetrievalHit, Retriever, RetrieverError, RoundOutcome,
    SessionConfig, SessionError, SessionId, SessionSummary,
};
