//! The passage corpus and its source metadata.
//!
//! Passages arrive as a static JSON resource prepared alongside the
//! embedding index. The engine never touches the embeddings themselves —
//! nearest-neighbor search belongs to the host's retriever — but it owns
//! the id index, the unique-metadata totals that drive discovery
//! progress, and the random starting-passage draw.

use crate::discovery::is_absent;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from loading the corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corpus contains no passages")]
    Empty,

    #[error("duplicate passage id {0:?}")]
    DuplicateId(String),
}

/// A corpus passage with its source metadata.
///
/// `author` and `story_title` may hold the placeholder `"None"` (or be
/// empty), signifying absent metadata in the source records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Unique passage id, e.g. `"PG10089_2"`.
    pub id: String,
    /// Source book id, e.g. `"PG10089"`.
    pub book: String,
    /// The passage text shown to the user.
    pub text: String,
    #[serde(default)]
    pub author: String,
    /// Book title.
    #[serde(default)]
    pub title: String,
    /// Story title within the book.
    #[serde(default, rename = "storytitle")]
    pub story_title: String,
    /// Precomputed embedding, consumed by the host's vector index; the
    /// engine itself never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Passage {
    /// Project Gutenberg link for the source book, derived from the book
    /// id by stripping the `PG` prefix and any `_part` suffix.
    pub fn gutenberg_url(&self) -> String {
        let numeric = self.book.trim_start_matches("PG");
        let numeric = numeric.split('_').next().unwrap_or(numeric);
        format!("https://www.gutenberg.org/ebooks/{numeric}")
    }

    /// Whether the record carries a real author name.
    pub fn has_author(&self) -> bool {
        !is_absent(&self.author)
    }

    /// Whether the record carries a real story title.
    pub fn has_story_title(&self) -> bool {
        !is_absent(&self.story_title)
    }
}

/// Unique metadata values available across the whole corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTotals {
    pub authors: usize,
    pub books: usize,
    pub stories: usize,
}

impl MetadataTotals {
    pub fn total(&self) -> usize {
        self.authors + self.books + self.stories
    }
}

/// The loaded passage corpus, immutable after load.
#[derive(Debug, Clone)]
pub struct Corpus {
    passages: Vec<Passage>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus from passages, indexing by id.
    pub fn new(passages: Vec<Passage>) -> Result<Self, CorpusError> {
        if passages.is_empty() {
            return Err(CorpusError::Empty);
        }
        let mut by_id = HashMap::with_capacity(passages.len());
        for (i, passage) in passages.iter().enumerate() {
            if by_id.insert(passage.id.clone(), i).is_some() {
                return Err(CorpusError::DuplicateId(passage.id.clone()));
            }
        }
        Ok(Self { passages, by_id })
    }

    /// Parse a corpus from a JSON array of passage records.
    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        let passages: Vec<Passage> = serde_json::from_str(json)?;
        Self::new(passages)
    }

    /// Load a corpus from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    /// Look up a passage by id.
    pub fn get(&self, id: &str) -> Option<&Passage> {
        self.by_id.get(id).map(|&i| &self.passages[i])
    }

    /// All passages, in load order.
    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Count the distinct authors, books and stories in the corpus.
    /// Placeholder values do not count.
    pub fn metadata_totals(&self) -> MetadataTotals {
        let mut authors = HashSet::new();
        let mut books = HashSet::new();
        let mut stories = HashSet::new();
        for passage in &self.passages {
            if !is_absent(&passage.author) {
                authors.insert(passage.author.trim());
            }
            if !is_absent(&passage.title) {
                books.insert(passage.title.trim());
            }
            if !is_absent(&passage.story_title) {
                stories.insert(passage.story_title.trim());
            }
        }
        MetadataTotals {
            authors: authors.len(),
            books: books.len(),
            stories: stories.len(),
        }
    }

    /// Draw a random starting passage.
    pub fn random_passage(&self) -> &Passage {
        self.random_passage_with_rng(&mut rand::thread_rng())
    }

    /// Deterministic variant for tests: draw from the supplied RNG.
    pub fn random_passage_with_rng<R: Rng>(&self, rng: &mut R) -> &Passage {
        &self.passages[rng.gen_range(0..self.passages.len())]
    }
}
