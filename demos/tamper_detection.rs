//! Detecting a modified review through the saved root
//!
//! Writes a small dataset to a temporary directory, saves the root, edits a
//! review and compares again.
//!
//! Run with: cargo run --example tamper_detection

use revtree_cli::{CliConfig, Session};
use std::io::Write;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let dir = std::env::temp_dir().join("revtree-tamper-demo");
    std::fs::create_dir_all(&dir)?;

    let dataset = dir.join("reviews.json");
    let mut file = std::fs::File::create(&dataset)?;
    for i in 0..8 {
        let line = serde_json::json!({
            "reviewID": format!("R{}", i),
            "reviewText": format!("review number {}", i),
        });
        writeln!(file, "{}", line)?;
    }
    // Missing ID, gets a generated one
    writeln!(file, "{}", serde_json::json!({ "reviewText": "anonymous" }))?;
    drop(file);

    let mut session = Session::new(CliConfig::in_dir(&dir));
    let loaded = session.load_dataset(&dataset)?;
    println!("Loaded {} reviews ({} skipped)", loaded.len(), loaded.skipped);
    println!("Last ID: {}", session.records()[loaded.len() - 1].id);

    session.build_tree()?;
    let saved = session.save_root()?;
    println!("Saved root:   {}", saved);
    println!("Compare:      {:?}", session.compare_root()?);

    let outcome = session.modify_review(3, "review number 3, edited")?;
    println!("Edited root:  {}", outcome.root);
    println!("Compare:      {:?}", session.compare_root()?);
    println!("Tamper check: {:?}", session.simulate_tampering()?);

    Ok(())
}
