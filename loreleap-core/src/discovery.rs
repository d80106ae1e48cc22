//! First-sighting tracking for passage metadata.
//!
//! Authors, books and stories are worth fixed points the first time a
//! session surfaces them. Discoveries arriving with the opening passage
//! still count toward totals and progress but award nothing — the first
//! quote a user sees must not hand out points.

use crate::corpus::{MetadataTotals, Passage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Points for discovering a new author.
pub const AUTHOR_POINTS: u32 = 7;
/// Points for discovering a new book.
pub const BOOK_POINTS: u32 = 5;
/// Points for discovering a new story.
pub const STORY_POINTS: u32 = 3;

/// The kinds of metadata a passage can reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveryKind {
    Author,
    Book,
    Story,
}

impl DiscoveryKind {
    pub const ALL: [DiscoveryKind; 3] =
        [DiscoveryKind::Author, DiscoveryKind::Book, DiscoveryKind::Story];

    /// Fixed point value for a first sighting of this kind.
    pub fn points(&self) -> u32 {
        match self {
            DiscoveryKind::Author => AUTHOR_POINTS,
            DiscoveryKind::Book => BOOK_POINTS,
            DiscoveryKind::Story => STORY_POINTS,
        }
    }

    /// Display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            DiscoveryKind::Author => "author",
            DiscoveryKind::Book => "book",
            DiscoveryKind::Story => "story",
        }
    }
}

/// A first sighting of an author, book or story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEvent {
    pub kind: DiscoveryKind,
    pub value: String,
    pub points: u32,
}

/// All discoveries from a single user action, combined so the host fires
/// one celebration with the summed points instead of one per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryBatch {
    pub events: Vec<DiscoveryEvent>,
}

impl DiscoveryBatch {
    /// Combined point value of the batch.
    pub fn total_points(&self) -> u32 {
        self.events.iter().map(|e| e.points).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Percentage progress toward exhausting the corpus metadata, rounded to
/// whole percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryProgress {
    pub authors: u32,
    pub books: u32,
    pub stories: u32,
    pub overall: u32,
}

/// Tracks which metadata values a session has already surfaced.
///
/// Seen-sets use exact, case-sensitive string equality and only ever
/// grow. Owned by the session; one logical user action mutates it at a
/// time.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryTracker {
    authors: HashSet<String>,
    books: HashSet<String>,
    stories: HashSet<String>,
}

impl DiscoveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metadata value.
    ///
    /// Returns the scoring event for a first sighting, or `None` when the
    /// value was already seen, is absent (`"None"`, empty or whitespace),
    /// or arrived with the opening passage (`is_initial_load`) — in the
    /// initial-load case the sighting is still recorded, so it counts
    /// toward totals and progress without awarding points.
    pub fn track_item(
        &mut self,
        kind: DiscoveryKind,
        value: &str,
        is_initial_load: bool,
    ) -> Option<DiscoveryEvent> {
        if is_absent(value) {
            return None;
        }
        if !self.seen_mut(kind).insert(value.to_string()) {
            return None;
        }
        if is_initial_load {
            return None;
        }
        Some(DiscoveryEvent {
            kind,
            value: value.to_string(),
            points: kind.points(),
        })
    }

    /// Record all three metadata fields of a passage as one batch.
    pub fn track_passage(&mut self, passage: &Passage, is_initial_load: bool) -> DiscoveryBatch {
        let mut batch = DiscoveryBatch::default();
        let fields = [
            (DiscoveryKind::Author, &passage.author),
            (DiscoveryKind::Book, &passage.title),
            (DiscoveryKind::Story, &passage.story_title),
        ];
        for (kind, value) in fields {
            if let Some(event) = self.track_item(kind, value, is_initial_load) {
                batch.events.push(event);
            }
        }
        batch
    }

    /// How many distinct values of a kind have been seen.
    pub fn discovered(&self, kind: DiscoveryKind) -> usize {
        self.seen(kind).len()
    }

    /// Distinct values seen across all kinds.
    pub fn total_discovered(&self) -> usize {
        DiscoveryKind::ALL
            .iter()
            .map(|&kind| self.discovered(kind))
            .sum()
    }

    /// Point value of everything discovered so far, initial load included.
    pub fn total_points(&self) -> u32 {
        DiscoveryKind::ALL
            .iter()
            .map(|&kind| self.discovered(kind) as u32 * kind.points())
            .sum()
    }

    /// Whether a value has been seen for a kind (exact match).
    pub fn contains(&self, kind: DiscoveryKind, value: &str) -> bool {
        self.seen(kind).contains(value)
    }

    /// Discovered values for a kind, sorted for display.
    pub fn values(&self, kind: DiscoveryKind) -> Vec<&str> {
        let mut values: Vec<&str> = self.seen(kind).iter().map(String::as_str).collect();
        values.sort_unstable();
        values
    }

    /// Progress percentages against the corpus totals. A kind with no
    /// values in the corpus reports 0.
    pub fn progress(&self, totals: &MetadataTotals) -> DiscoveryProgress {
        DiscoveryProgress {
            authors: percentage(self.authors.len(), totals.authors),
            books: percentage(self.books.len(), totals.books),
            stories: percentage(self.stories.len(), totals.stories),
            overall: percentage(self.total_discovered(), totals.total()),
        }
    }

    fn seen(&self, kind: DiscoveryKind) -> &HashSet<String> {
        match kind {
            DiscoveryKind::Author => &self.authors,
            DiscoveryKind::Book => &self.books,
            DiscoveryKind::Story => &self.stories,
        }
    }

    fn seen_mut(&mut self, kind: DiscoveryKind) -> &mut HashSet<String> {
        match kind {
            DiscoveryKind::Author => &mut self.authors,
            DiscoveryKind::Book => &mut self.books,
            DiscoveryKind::Story => &mut self.stories,
        }
    }
}

fn percentage(found: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((found as f64 / total as f64) * 100.0).round() as u32
}

/// `"None"`, empty and whitespace-only values signify absent metadata.
pub(crate) fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "None"
}
