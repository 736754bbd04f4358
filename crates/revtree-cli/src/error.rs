//! Error types for the revtree front end

use revtree_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `CliError`
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the menu and command line
#[derive(Error, Debug)]
pub enum CliError {
    /// No records loaded
    #[error("no dataset loaded, load the dataset first")]
    NoDataset,

    /// Operation needs a built tree
    #[error("build the Merkle tree first")]
    TreeNotBuilt,

    /// Dataset file could not be opened
    #[error("could not open dataset file {path}: {source}")]
    DatasetOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No root file to compare against
    #[error("no saved root to compare: {0}")]
    NoSavedRoot(PathBuf),

    /// Selector matched neither an index nor a review ID
    #[error("review ID not found: {0}")]
    RecordNotFound(String),

    /// Index outside the loaded records
    #[error("invalid index {index}, expected 0 - {max}", max = .len.saturating_sub(1))]
    IndexOutOfRange { index: usize, len: usize },

    /// Core tree error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
