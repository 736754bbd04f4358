//! Front-end configuration

use crate::Result;
use revtree_crypto::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `REVTREE_ROOT_FILE`
pub const ENV_PREFIX: &str = "REVTREE";

/// Default configuration file, read if present
pub const DEFAULT_CONFIG_FILE: &str = "revtree.toml";

/// Output locations and tuning for the front end
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where the root hex is persisted
    pub root_file: PathBuf,
    /// DOT output for the whole tree
    pub tree_dot_file: PathBuf,
    /// DOT output for a proof path
    pub proof_dot_file: PathBuf,
    /// CSV output of the performance harness
    pub perf_csv_file: PathBuf,
    /// Number of random proofs timed by the performance harness
    pub perf_tests: usize,
    /// Hash function for leaves and internal nodes
    pub hash_algorithm: HashAlgorithm,
    /// Run Graphviz `dot -Tpng` after writing a DOT file
    pub render_png: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            root_file: PathBuf::from("merkle_root.txt"),
            tree_dot_file: PathBuf::from("merkle_tree.dot"),
            proof_dot_file: PathBuf::from("merkle_proof_tree.dot"),
            perf_csv_file: PathBuf::from("performance_results.csv"),
            perf_tests: 20,
            hash_algorithm: HashAlgorithm::Sha256,
            render_png: false,
        }
    }
}

impl CliConfig {
    /// Load defaults, then `file` (if it exists), then `REVTREE_*` variables
    pub fn load(file: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Place every output file under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = Self::default();
        Self {
            root_file: dir.join(&defaults.root_file),
            tree_dot_file: dir.join(&defaults.tree_dot_file),
            proof_dot_file: dir.join(&defaults.proof_dot_file),
            perf_csv_file: dir.join(&defaults.perf_csv_file),
            ..defaults
        }
    }

    /// Override the root file location
    pub fn with_root_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_file = path.into();
        self
    }

    /// Override the hash function
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }
}
