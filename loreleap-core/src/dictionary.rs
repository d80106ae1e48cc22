//! Category dictionary and word-score table.
//!
//! Both are static JSON resources prepared outside the engine: the
//! dictionary maps category names to curated phrase lists, and the score
//! table maps lowercase words to point values. Loading validates eagerly
//! so a malformed resource fails startup instead of silently matching
//! nothing — an empty dictionary is indistinguishable from "no matches"
//! and would corrupt every scoring invariant downstream.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from loading the category dictionary or word-score table.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dictionary contains no categories")]
    EmptyDictionary,

    #[error("category {0:?} is not an array of phrase strings")]
    MalformedCategory(String),

    #[error("category {0:?} has no phrases")]
    EmptyCategory(String),

    #[error("category {category:?} contains a blank phrase")]
    BlankPhrase { category: String },

    #[error("failed to compile pattern for phrase {phrase:?}: {source}")]
    Pattern {
        phrase: String,
        source: regex::Error,
    },

    #[error("word-score table is empty")]
    EmptyScores,

    #[error("word {word:?} has invalid score {score}")]
    InvalidScore { word: String, score: f64 },
}

/// A curated phrase with its compiled whole-word pattern.
///
/// Phrases are literal: regex metacharacters in a definition carry no
/// special meaning, and matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct PhrasePattern {
    text: String,
    pattern: Regex,
}

impl PhrasePattern {
    fn compile(raw: &str) -> Result<Self, DictionaryError> {
        let text = raw.trim().to_lowercase();
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&text))).map_err(|source| {
            DictionaryError::Pattern {
                phrase: raw.to_string(),
                source,
            }
        })?;
        Ok(Self { text, pattern })
    }

    /// The phrase as written in the dictionary, lowercased.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the phrase occurs as a whole word anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Every occurrence of the phrase in `text`, as half-open byte spans.
    pub(crate) fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.pattern
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    /// Character count, used for longest-first overlap resolution.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A named bucket of curated phrases.
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    phrases: Vec<PhrasePattern>,
}

impl Category {
    /// Category name as it appears in the dictionary.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category's phrase patterns, in dictionary order.
    pub fn phrases(&self) -> &[PhrasePattern] {
        &self.phrases
    }
}

/// The category → phrase-list dictionary, immutable after load.
///
/// Iteration order follows the JSON resource's insertion order, which is
/// also the order categories appear in match results.
#[derive(Debug, Clone)]
pub struct CategoryDictionary {
    categories: Vec<Category>,
    name_index: HashMap<String, usize>,
}

impl CategoryDictionary {
    /// Parse a dictionary from a JSON object of `name -> [phrase, ...]`.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let root: serde_json::Map<String, Value> = serde_json::from_str(json)?;
        if root.is_empty() {
            return Err(DictionaryError::EmptyDictionary);
        }

        let mut categories = Vec::with_capacity(root.len());
        let mut name_index = HashMap::with_capacity(root.len());
        for (name, value) in root {
            let raw = value
                .as_array()
                .ok_or_else(|| DictionaryError::MalformedCategory(name.clone()))?;

            let mut phrases: Vec<PhrasePattern> = Vec::with_capacity(raw.len());
            for entry in raw {
                let phrase = entry
                    .as_str()
                    .ok_or_else(|| DictionaryError::MalformedCategory(name.clone()))?;
                if phrase.trim().is_empty() {
                    return Err(DictionaryError::BlankPhrase { category: name });
                }
                // Repeated phrases add nothing to matching.
                let lowered = phrase.trim().to_lowercase();
                if phrases.iter().any(|p| p.text() == lowered) {
                    continue;
                }
                phrases.push(PhrasePattern::compile(phrase)?);
            }
            if phrases.is_empty() {
                return Err(DictionaryError::EmptyCategory(name));
            }

            name_index.insert(name.clone(), categories.len());
            categories.push(Category { name, phrases });
        }

        Ok(Self {
            categories,
            name_index,
        })
    }

    /// Build a dictionary from `(name, phrases)` pairs.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let mut categories = Vec::new();
        let mut name_index = HashMap::new();
        for (name, raw) in entries {
            let mut phrases = Vec::with_capacity(raw.len());
            for phrase in raw {
                if phrase.trim().is_empty() {
                    return Err(DictionaryError::BlankPhrase {
                        category: name.to_string(),
                    });
                }
                let lowered = phrase.trim().to_lowercase();
                if phrases.iter().any(|p: &PhrasePattern| p.text() == lowered) {
                    continue;
                }
                phrases.push(PhrasePattern::compile(phrase)?);
            }
            if phrases.is_empty() {
                return Err(DictionaryError::EmptyCategory(name.to_string()));
            }
            name_index.insert(name.to_string(), categories.len());
            categories.push(Category {
                name: name.to_string(),
                phrases,
            });
        }
        if categories.is_empty() {
            return Err(DictionaryError::EmptyDictionary);
        }
        Ok(Self {
            categories,
            name_index,
        })
    }

    /// Load a dictionary from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    /// All categories, in dictionary order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.name_index.get(name).map(|&i| &self.categories[i])
    }

    /// Category names in dictionary order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Word → score lookup, immutable after load. Missing words score 0.
#[derive(Debug, Clone, Default)]
pub struct WordScoreTable {
    scores: HashMap<String, f64>,
}

impl WordScoreTable {
    /// Parse a table from a JSON object of `word -> score`.
    ///
    /// Scores must be finite and non-negative; keys are lowercased.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let raw: HashMap<String, f64> = serde_json::from_str(json)?;
        if raw.is_empty() {
            return Err(DictionaryError::EmptyScores);
        }
        let mut scores = HashMap::with_capacity(raw.len());
        for (word, score) in raw {
            if !score.is_finite() || score < 0.0 {
                return Err(DictionaryError::InvalidScore { word, score });
            }
            scores.insert(word.to_lowercase(), score);
        }
        Ok(Self { scores })
    }

    /// Build a table from `(word, score)` pairs.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut scores = HashMap::new();
        for (word, score) in entries {
            if !score.is_finite() || score < 0.0 {
                return Err(DictionaryError::InvalidScore {
                    word: word.to_string(),
                    score,
                });
            }
            scores.insert(word.to_lowercase(), score);
        }
        if scores.is_empty() {
            return Err(DictionaryError::EmptyScores);
        }
        Ok(Self { scores })
    }

    /// Load a table from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    /// Score for a single word; unknown words score 0.
    pub fn score(&self, word: &str) -> f64 {
        self.scores
            .get(word.to_lowercase().as_str())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_preserves_insertion_order() {
        let dict = CategoryDictionary::from_json_str(
            r#"{"myth": ["giant"], "animals": ["fox"], "nature": ["forest"]}"#,
        )
        .unwrap();
        let names: Vec<_> = dict.category_names().collect();
        assert_eq!(names, vec!["myth", "animals", "nature"]);
    }

    #[test]
    fn test_dictionary_rejects_empty() {
        assert!(matches!(
            CategoryDictionary::from_json_str("{}"),
            Err(DictionaryError::EmptyDictionary)
        ));
    }

    #[test]
    fn test_dictionary_rejects_malformed_category() {
        assert!(matches!(
            CategoryDictionary::from_json_str(r#"{"animals": "fox"}"#),
            Err(DictionaryError::MalformedCategory(_))
        ));
        assert!(matches!(
            CategoryDictionary::from_json_str(r#"{"animals": [42]}"#),
            Err(DictionaryError::MalformedCategory(_))
        ));
    }

    #[test]
    fn test_dictionary_rejects_blank_phrase() {
        assert!(matches!(
            CategoryDictionary::from_json_str(r#"{"animals": ["fox", "   "]}"#),
            Err(DictionaryError::BlankPhrase { .. })
        ));
    }

    #[test]
    fn test_dictionary_dedupes_phrases() {
        let dict =
            CategoryDictionary::from_json_str(r#"{"animals": ["fox", "Fox", "fox"]}"#).unwrap();
        assert_eq!(dict.get("animals").unwrap().phrases().len(), 1);
    }

    #[test]
    fn test_phrase_metacharacters_are_literal() {
        let dict =
            CategoryDictionary::from_entries([("odd", vec!["mr. fox", "what? (really)"])])
                .unwrap();

        let literal = &dict.get("odd").unwrap().phrases()[0];
        assert!(literal.is_match("old Mr. Fox spoke"));
        // A literal dot, not a wildcard.
        assert!(!literal.is_match("old mrs fox spoke"));

        // A phrase ending in a non-word character cannot sit on a word
        // boundary; it never matches, and never errors either.
        let hostile = &dict.get("odd").unwrap().phrases()[1];
        assert!(!hostile.is_match("she asked what? (really) twice"));
    }

    #[test]
    fn test_phrase_match_is_case_insensitive() {
        let dict = CategoryDictionary::from_entries([("animals", vec!["Silver Fox"])]).unwrap();
        let pattern = &dict.get("animals").unwrap().phrases()[0];
        assert_eq!(pattern.text(), "silver fox");
        assert!(pattern.is_match("a SILVER FOX ran by"));
    }

    #[test]
    fn test_word_scores_reject_negative() {
        assert!(matches!(
            WordScoreTable::from_json_str(r#"{"fox": -1.0}"#),
            Err(DictionaryError::InvalidScore { .. })
        ));
    }

    #[test]
    fn test_word_scores_reject_empty() {
        assert!(matches!(
            WordScoreTable::from_json_str("{}"),
            Err(DictionaryError::EmptyScores)
        ));
    }

    #[test]
    fn test_word_score_lookup_defaults_to_zero() {
        let table = WordScoreTable::from_entries([("fox", 3.0)]).unwrap();
        assert_eq!(table.score("fox"), 3.0);
        assert_eq!(table.score("FOX"), 3.0);
        assert_eq!(table.score("wolverine"), 0.0);
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"animals": ["fox"]}}"#).unwrap();

        let dict = CategoryDictionary::load(file.path()).await.unwrap();
        assert_eq!(dict.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let result = CategoryDictionary::load("/nonexistent/category-words.json").await;
        assert!(matches!(result, Err(DictionaryError::Io(_))));
    }
}
