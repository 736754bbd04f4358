//! Basic usage of the revtree library
//!
//! This example demonstrates:
//! - Building a tree from in-memory records
//! - Generating and verifying an inclusion proof
//! - Serializing a proof to JSON
//!
//! Run with: cargo run --example basic_usage

use revtree_core::{verify_proof, HashAlgorithm, MerkleTree, Record};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let records = vec![
        Record::new("R1", "Great product, arrived on time."),
        Record::new("R2", "Broke after a week."),
        Record::new("R3", "Does what it says."),
        Record::new("R4", "Would buy again."),
        Record::new("R5", "Packaging was damaged."),
    ];

    for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Blake3] {
        let tree = MerkleTree::from_records(&algorithm, &records);
        println!(
            "{}: {} leaves, {} nodes, depth {}",
            algorithm,
            tree.leaf_count(),
            tree.node_count(),
            tree.depth()
        );
        println!("  root {}", tree.root_hex().unwrap_or_default());
    }

    // Proof for the last record, whose parent level is a promotion
    let hasher = HashAlgorithm::Sha256;
    let tree = MerkleTree::from_records(&hasher, &records);
    let leaf = records[4].leaf_digest(&hasher);
    let proof = tree.generate_proof(&leaf)?;
    let root = tree.root_digest().ok_or_else(|| anyhow::anyhow!("empty tree"))?;

    println!("\nProof for {} ({} steps):", records[4].id, proof.len());
    println!("{}", serde_json::to_string_pretty(&proof)?);
    println!("verified: {}", verify_proof(&hasher, &leaf, &proof, root));

    Ok(())
}
