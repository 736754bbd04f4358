//! # revtree CLI
//!
//! Front end for building Merkle trees over review datasets.
//!
//! This crate provides:
//! - **Dataset loading**: JSON-lines reviews with generated IDs for gaps
//! - **Root persistence**: save and compare the root digest
//! - **Proofs**: generate, verify and draw inclusion proofs
//! - **Graphviz export**: tree and proof-path DOT files
//! - **Performance harness**: timed proof round trips written to CSV
//!
//! The same [`Session`] sits behind the interactive [`menu::Menu`] and the
//! scripted subcommands of the `revtree` binary.

pub mod config;
pub mod dataset;
pub mod dot;
pub mod error;
pub mod menu;
pub mod perf;
pub mod root_store;
pub mod session;

pub use config::CliConfig;
pub use dataset::Dataset;
pub use error::{CliError, Result};
pub use menu::Menu;
pub use perf::PerfReport;
pub use root_store::RootComparison;
pub use session::{ModifyOutcome, ProofReport, Session, TamperStatus};
