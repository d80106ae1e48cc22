//! Overlap resolution for phrase occurrences.
//!
//! Candidate phrases can claim overlapping stretches of text ("fox"
//! inside "silver fox"). Resolution is greedy longest-first over
//! half-open byte spans: a candidate is accepted only when its span
//! intersects no already-accepted span, and ties in length fall back to
//! first-seen order. Identical inputs always resolve identically — the
//! accepted spans feed the host's highlight animation, which must not
//! flicker between runs.

use crate::dictionary::{CategoryDictionary, PhrasePattern};
use crate::matcher::PhraseMatch;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// A phrase occurrence in a specific text, as a half-open byte span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanMatch {
    pub start: usize,
    pub end: usize,
    /// The matched text exactly as it appears in the source.
    pub phrase: String,
    /// The category that claimed the span.
    pub category: String,
}

impl SpanMatch {
    /// Half-open interval intersection test.
    pub fn overlaps(&self, other: &SpanMatch) -> bool {
        self.start < other.end && self.end > other.start
    }
}

fn spans_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && a.1 > b.0
}

/// Filter `candidates` down to the phrases that claim at least one
/// occurrence span no longer (or earlier-seen) phrase already claimed.
///
/// Every non-conflicting occurrence of a phrase is claimed, so a short
/// phrase survives when it also appears somewhere outside a longer
/// phrase's span.
pub(crate) fn resolve_phrases<'a>(
    candidates: &[&'a PhrasePattern],
    text: &str,
) -> Vec<&'a PhrasePattern> {
    let mut ordered = candidates.to_vec();
    // Stable sort keeps first-seen order for equal lengths.
    ordered.sort_by_key(|p| Reverse(p.char_len()));

    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut kept = Vec::new();
    for pattern in ordered {
        let mut found = false;
        for span in pattern.find_spans(text) {
            if claimed.iter().all(|c| !spans_overlap(*c, span)) {
                claimed.push(span);
                found = true;
            }
        }
        if found {
            kept.push(pattern);
        }
    }
    kept
}

/// Collect every occurrence span of every matched phrase across all
/// categories of `matches`, unresolved.
pub fn collect_spans(
    text: &str,
    matches: &[PhraseMatch],
    dictionary: &CategoryDictionary,
) -> Vec<SpanMatch> {
    let mut candidates = Vec::new();
    for m in matches {
        let Some(category) = dictionary.get(&m.category) else {
            continue;
        };
        for phrase in &m.phrases {
            let Some(pattern) = category.phrases().iter().find(|p| p.text() == *phrase) else {
                continue;
            };
            for (start, end) in pattern.find_spans(text) {
                candidates.push(SpanMatch {
                    start,
                    end,
                    phrase: text[start..end].to_string(),
                    category: m.category.clone(),
                });
            }
        }
    }
    candidates
}

/// Resolve overlapping candidate spans across categories.
///
/// The longer candidate wins a contested region; equal lengths fall back
/// to first-seen order. Once a region is claimed no other category may
/// claim an overlapping one. Accepted spans come back in document order
/// so the host can walk the text left to right. Zero candidates resolve
/// to an empty set.
pub fn resolve_spans(candidates: Vec<SpanMatch>) -> Vec<SpanMatch> {
    let mut ordered = candidates;
    ordered.sort_by_key(|s| Reverse(s.phrase.chars().count()));

    let mut accepted: Vec<SpanMatch> = Vec::new();
    for candidate in ordered {
        if accepted.iter().all(|a| !a.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|s| s.start);
    accepted
}

/// Candidate collection and resolution in one call: the non-overlapping
/// highlight spans for `text` given its category matches.
pub fn highlight_spans(
    text: &str,
    matches: &[PhraseMatch],
    dictionary: &CategoryDictionary,
) -> Vec<SpanMatch> {
    resolve_spans(collect_spans(text, matches, dictionary))
}
