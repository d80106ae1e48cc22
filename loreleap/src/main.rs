//! Terminal front-end for the loreleap exploration game.
//!
//! Loads the bundled sample corpus, dictionary and word scores, then
//! runs a line-based loop: type a phrase "selected" from the current
//! passage and the game leaps to a related one, scoring categories and
//! discoveries along the way. Retrieval is a simple lexical-overlap
//! stand-in for the embedding index the web host would use.

use async_trait::async_trait;
use crossterm::style::{Color, Stylize};
use loreleap_core::{
    CategoryDictionary, Corpus, DiscoveryKind, ExplorationSession, Passage, RetrievalHit,
    Retriever, RetrieverError, RoundOutcome, SessionConfig, SessionError, SpanMatch,
    WordScoreTable,
};
use std::collections::HashSet;
use std::io::{stdin, stdout, BufRead, Write};

const CATEGORY_WORDS: &str = include_str!("../data/category-words.json");
const SCORES_LOOKUP: &str = include_str!("../data/scores_lookup.json");
const PASSAGES: &str = include_str!("../data/passages.json");

const CATEGORY_COLORS: [Color; 6] = [
    Color::Yellow,
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

/// Lexical stand-in for the embedding index: ranks passages by word
/// overlap with the query.
struct LexicalRetriever {
    docs: Vec<(String, HashSet<String>)>,
}

impl LexicalRetriever {
    fn new(corpus: &Corpus) -> Self {
        let docs = corpus
            .passages()
            .iter()
            .map(|p| (p.id.clone(), tokenize(&p.text)))
            .collect();
        Self { docs }
    }
}

#[async_trait]
impl Retriever for LexicalRetriever {
    async fn related(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalHit>, RetrieverError> {
        let query_words = tokenize(query);
        if query_words.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<RetrievalHit> = self
            .docs
            .iter()
            .filter_map(|(id, words)| {
                let shared = query_words.intersection(words).count();
                if shared == 0 {
                    return None;
                }
                let union = query_words.union(words).count();
                Some(RetrievalHit::new(id.clone(), shared as f64 / union as f64))
            })
            .collect();
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(top_k);
        Ok(hits)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn category_color(dictionary: &CategoryDictionary, category: &str) -> Color {
    let index = dictionary
        .category_names()
        .position(|name| name == category)
        .unwrap_or(0);
    CATEGORY_COLORS[index % CATEGORY_COLORS.len()]
}

/// Print the passage with its highlight spans colored per category.
fn print_passage(text: &str, highlights: &[SpanMatch], dictionary: &CategoryDictionary) {
    let mut cursor = 0;
    print!("  ");
    for span in highlights {
        print!("{}", &text[cursor..span.start]);
        let color = category_color(dictionary, &span.category);
        print!("{}", span.phrase.clone().with(color).bold());
        cursor = span.end;
    }
    println!("{}", &text[cursor..]);
}

fn print_source(passage: &Passage) {
    let author = if passage.has_author() {
        passage.author.clone()
    } else {
        "No author found".to_string()
    };
    let mut line = format!("{author} - {}", passage.title);
    if passage.has_story_title() {
        line.push_str(&format!(", \"{}\"", passage.story_title));
    }
    println!("  {}", line.italic().dim());
    println!("  {}", passage.gutenberg_url().dim());
}

fn print_round(round: &RoundOutcome, dictionary: &CategoryDictionary) {
    println!();
    print_passage(&round.passage.text, &round.highlights, dictionary);
    print_source(&round.passage);
    println!("  {}", format!("similarity {:.2}", round.similarity).dim());

    if round.score_delta.is_celebratory() {
        let total = round.score_delta.total.round();
        println!("\n  {}", format!("+{total} pts!").yellow().bold());
        for (category, award) in &round.score_delta.per_category {
            let color = category_color(dictionary, category);
            println!(
                "    {} +{}",
                category.clone().with(color),
                award.round()
            );
        }
    }

    if !round.discoveries.is_empty() {
        let total = round.discoveries.total_points();
        println!("\n  {}", format!("+{total} pts - new sources!").magenta().bold());
        for event in &round.discoveries.events {
            println!("    new {}: {} (+{})", event.kind.name(), event.value, event.points);
        }
    }

    println!("\n  {}", "Standings".underlined());
    for row in round.standings.iter().take(5) {
        if row.count == 0 {
            continue;
        }
        let color = category_color(dictionary, &row.category);
        println!(
            "    {:<12} {:>4} pts ({} found)",
            row.category.clone().with(color),
            row.score.round(),
            row.count
        );
    }
}

fn print_score(session: &ExplorationSession) {
    let summary = session.summary();
    let progress = session.progress();
    println!("\n  {}", "Exploration summary".underlined());
    println!("    total score     {:>6}", summary.total_score.round());
    println!("    category points {:>6}", summary.category_points.round());
    println!("    source points   {:>6}", summary.discovery_points);
    println!("    items found     {:>6}", summary.items_found);
    println!(
        "    authors {}%, books {}%, stories {}% discovered",
        progress.authors, progress.books, progress.stories
    );
}

fn print_sources(session: &ExplorationSession) {
    println!("\n  {}", "Discovered sources".underlined());
    for kind in DiscoveryKind::ALL {
        let values = session.discoveries().values(kind);
        if values.is_empty() {
            continue;
        }
        println!("    {}s: {}", kind.name(), values.join("; "));
    }
}

fn print_categories(session: &ExplorationSession) {
    println!("\n  {}", "Category collections".underlined());
    for row in session.scoreboard().ranked_categories() {
        let Some(totals) = session.scoreboard().category(&row.category) else {
            continue;
        };
        let color = category_color(session.dictionary(), &row.category);
        let phrases: Vec<String> = totals
            .matched_phrases()
            .map(|p| loreleap_core::phrase_score_display(p, session.word_scores()))
            .collect();
        let detail = if phrases.is_empty() {
            "nothing yet".to_string()
        } else {
            phrases.join(", ")
        };
        println!(
            "    {:<12} {}",
            row.category.clone().with(color),
            detail
        );
    }
}

fn print_help() {
    println!("\n  Type a phrase from the passage to leap to a related one.");
    println!("  Commands: :score  :sources  :categories  :help  :quit");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dictionary = CategoryDictionary::from_json_str(CATEGORY_WORDS)?;
    let word_scores = WordScoreTable::from_json_str(SCORES_LOOKUP)?;
    let corpus = Corpus::from_json_str(PASSAGES)?;
    let retriever = LexicalRetriever::new(&corpus);

    let mut session = ExplorationSession::new(
        SessionConfig::default(),
        dictionary,
        word_scores,
        corpus,
        Box::new(retriever),
    );

    println!("{}", "loreleap".bold());
    println!("Select words from the passage; related text takes its place.");
    print_help();
    println!();

    let initial = session.initial_view().clone();
    print_passage(&initial.passage.text, &initial.highlights, session.dictionary());
    print_source(&initial.passage);

    let input = stdin();
    loop {
        print!("\n> ");
        stdout().flush()?;

        let mut line = String::new();
        if input.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            ":quit" | ":q" => break,
            ":help" => print_help(),
            ":score" => print_score(&session),
            ":sources" => print_sources(&session),
            ":categories" => print_categories(&session),
            selection => match session.select(selection).await {
                Ok(round) => print_round(&round, session.dictionary()),
                Err(SessionError::SelectionTooShort) => {
                    println!("  {}", "Please select a longer word or phrase.".dim());
                }
                Err(SessionError::NoFreshPassage(_)) => {
                    println!("  {}", "No fresh passage found - try different words.".dim());
                }
                Err(err) => {
                    println!("  {}", format!("error: {err}").red());
                }
            },
        }
    }

    print_score(&session);
    println!("\nFarewell, explorer.");
    Ok(())
}
