//! revtree - Merkle trees over review datasets

use clap::{Parser, Subcommand};
use revtree_cli::{menu, CliConfig, Menu, RootComparison, Session, TamperStatus};
use revtree_crypto::HashAlgorithm;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "revtree")]
#[command(about = "Build Merkle trees over review datasets, persist roots and check proofs")]
#[command(version)]
struct Args {
    /// Configuration file (read if present)
    #[arg(short, long, default_value = revtree_cli::config::DEFAULT_CONFIG_FILE, env = "REVTREE_CONFIG")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, env = "REVTREE_DEBUG")]
    debug: bool,

    /// Hash function (sha256 or blake3), overrides the configuration
    #[arg(long, global = true)]
    hash: Option<HashAlgorithm>,

    /// Root file, overrides the configuration
    #[arg(long, global = true)]
    root_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,
    /// Load a dataset and print its root
    Build {
        #[arg(long)]
        dataset: PathBuf,
    },
    /// Generate and verify the proof for a record index or review ID
    Prove {
        #[arg(long)]
        dataset: PathBuf,
        selector: String,
        /// Print the proof as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the tree and persist its root
    SaveRoot {
        #[arg(long)]
        dataset: PathBuf,
    },
    /// Build the tree and compare its root with the persisted one
    CompareRoot {
        #[arg(long)]
        dataset: PathBuf,
    },
    /// Replace one review's text and print the new root
    Modify {
        #[arg(long)]
        dataset: PathBuf,
        index: usize,
        text: String,
    },
    /// Check that the first record still proves into the root
    Tamper {
        #[arg(long)]
        dataset: PathBuf,
    },
    /// Write the tree as Graphviz DOT
    Visualize {
        #[arg(long)]
        dataset: PathBuf,
        /// Levels below the root to draw; negative means root only
        #[arg(allow_negative_numbers = true)]
        levels: i64,
    },
    /// Time random proof round trips and write the CSV
    Perf {
        #[arg(long)]
        dataset: PathBuf,
        /// Number of proofs, overrides the configuration
        #[arg(long)]
        tests: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("revtree_cli={},revtree_core={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Build configuration
    let mut config = CliConfig::load(&args.config)?;
    if let Some(hash) = args.hash {
        config = config.with_hash_algorithm(hash);
    }
    if let Some(root_file) = args.root_file {
        config = config.with_root_file(root_file);
    }
    tracing::debug!(?config, "configuration loaded");

    let mut session = Session::new(config);
    match args.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            Menu::new(&mut session, stdin.lock(), io::stdout()).run()?;
        }
        Command::Build { dataset } => {
            let tree = built(&mut session, &dataset)?;
            println!("{}", tree.root_hex().unwrap_or_default());
        }
        Command::Prove {
            dataset,
            selector,
            json,
        } => {
            built(&mut session, &dataset)?;
            let report = session.generate_proof(&selector)?;
            if json {
                let value = serde_json::json!({
                    "index": report.index,
                    "review_id": report.record_id,
                    "leaf": report.leaf,
                    "root": report.root,
                    "proof": report.proof,
                    "verified": report.verified,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("leaf: {}", report.leaf);
                for (i, step) in report.proof.iter().enumerate() {
                    println!("step {}: {:?} {}", i, step.side, step.sibling);
                }
                println!("root: {}", report.root);
                println!("verified: {}", report.verified);
            }
            if !report.verified {
                anyhow::bail!("proof for {} did not verify", report.record_id);
            }
        }
        Command::SaveRoot { dataset } => {
            built(&mut session, &dataset)?;
            let root = session.save_root()?;
            println!("{}", root);
        }
        Command::CompareRoot { dataset } => {
            built(&mut session, &dataset)?;
            match session.compare_root()? {
                RootComparison::Match => println!("Integrity Verified: Roots match."),
                RootComparison::Mismatch => {
                    anyhow::bail!("Data Integrity Violated: Roots do not match!")
                }
            }
        }
        Command::Modify {
            dataset,
            index,
            text,
        } => {
            built(&mut session, &dataset)?;
            let outcome = session.modify_review(index, text)?;
            println!("previous: {}", outcome.previous_text);
            println!("root: {}", outcome.root);
        }
        Command::Tamper { dataset } => {
            built(&mut session, &dataset)?;
            match session.simulate_tampering()? {
                TamperStatus::Intact => println!("NO TAMPERING DETECTED"),
                TamperStatus::Tampered => anyhow::bail!("TAMPERING DETECTED"),
            }
        }
        Command::Visualize { dataset, levels } => {
            built(&mut session, &dataset)?;
            let path = session.visualize_tree(levels.max(0) as usize)?;
            println!("DOT file generated: {}", path.display());
        }
        Command::Perf { dataset, tests } => {
            session.load_dataset(&dataset)?;
            let tests = tests.unwrap_or(session.config().perf_tests);
            let csv_file = session.config().perf_csv_file.clone();
            let report = revtree_cli::perf::run_to_csv(&mut session, tests, &csv_file)?;
            menu::write_perf_report(&mut io::stdout(), &report, &csv_file)?;
        }
    }

    Ok(())
}

fn built(
    session: &mut Session,
    dataset: &Path,
) -> anyhow::Result<std::sync::Arc<revtree_core::MerkleTree>> {
    let loaded = session.load_dataset(dataset)?;
    tracing::info!(records = loaded.len(), skipped = loaded.skipped, "dataset loaded");
    Ok(session.build_tree()?)
}
