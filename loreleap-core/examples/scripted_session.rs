//! Quick integration check for the exploration core, driven by the mock
//! retriever so no embedding model is needed.

use loreleap_core::testing::{MockRetriever, TestHarness};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Scripted exploration session ===\n");

    let mut harness = TestHarness::starting_from("p1", Vec::new());

    println!("Opening passage:");
    let initial = harness.session.initial_view();
    println!("   {}", initial.passage.text);
    for m in &initial.found {
        println!("   [{}] {}", m.category, m.phrases.join(", "));
    }

    harness
        .retriever
        .queue_response(MockRetriever::hits(&["p2", "p3"]));

    println!("\nSelecting \"the quiet forest\"...");
    let round = harness.session.select("the quiet forest").await?;
    println!("   Landed on {} ({:.2})", round.passage.id, round.similarity);
    println!("   {}", round.passage.text);
    println!("   +{} category pts", round.score_delta.total.round());
    if !round.discoveries.is_empty() {
        println!("   +{} discovery pts", round.discoveries.total_points());
    }

    println!("\nStandings:");
    for row in &round.standings {
        println!(
            "   {:<12} {:>4} pts  ({} found)",
            row.category,
            row.score.round(),
            row.count
        );
    }

    println!("\nTotal score: {}", harness.session.total_score().round());
    println!("\n=== Done ===");
    Ok(())
}
