//! Working session: loaded records plus the tree built from them
//!
//! Every record change rebuilds the whole tree and swaps it in; nothing is
//! patched in place.

use crate::{
    dataset::{self, Dataset},
    dot,
    root_store::{self, RootComparison},
    CliConfig, CliError, Result,
};
use revtree_core::{verify_proof, Digest, HashAlgorithm, MerkleTree, Proof, Record, SharedTree};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of generating and checking a proof for one record
#[derive(Clone, Debug)]
pub struct ProofReport {
    /// Position of the record in the dataset
    pub index: usize,
    /// Review ID of the record
    pub record_id: String,
    /// Leaf digest recomputed from the record
    pub leaf: Digest,
    /// Sibling path to the root
    pub proof: Proof,
    /// Root the proof was checked against
    pub root: Digest,
    /// Whether the proof folds to the root
    pub verified: bool,
    /// Proof graph written, if the proof had any steps
    pub dot_file: Option<PathBuf>,
}

/// Result of the tamper simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TamperStatus {
    /// The first record still proves into the current root
    Intact,
    /// The first record no longer proves into the current root
    Tampered,
}

/// Result of editing a review
#[derive(Clone, Debug)]
pub struct ModifyOutcome {
    /// Text before the edit
    pub previous_text: String,
    /// Root of the rebuilt tree
    pub root: Digest,
}

/// Records and tree state behind the menu and subcommands
pub struct Session {
    config: CliConfig,
    records: Vec<Record>,
    tree: SharedTree,
}

impl Session {
    /// Create an empty session
    pub fn new(config: CliConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            tree: SharedTree::new(),
        }
    }

    /// Session configuration
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Hash function in use
    pub fn hasher(&self) -> HashAlgorithm {
        self.config.hash_algorithm
    }

    /// Loaded records
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replace the loaded records; the current tree is kept until rebuilt
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    /// The current tree snapshot
    pub fn tree(&self) -> Result<Arc<MerkleTree>> {
        self.tree.snapshot().ok_or(CliError::TreeNotBuilt)
    }

    /// Whether a tree has been built
    pub fn is_built(&self) -> bool {
        self.tree.is_built()
    }

    /// Load a JSON-lines dataset, replacing the current records
    pub fn load_dataset(&mut self, path: &Path) -> Result<Dataset> {
        let dataset = dataset::load_reviews(path)?;
        self.records = dataset.records.clone();
        Ok(dataset)
    }

    /// Build a tree from the loaded records and make it current
    #[instrument(skip(self), fields(records = self.records.len()))]
    pub fn build_tree(&mut self) -> Result<Arc<MerkleTree>> {
        if self.records.is_empty() {
            return Err(CliError::NoDataset);
        }
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<Arc<MerkleTree>> {
        let tree = MerkleTree::from_records(&self.hasher(), &self.records);
        if let Some(root) = tree.root_hex() {
            info!(root = %root, leaves = tree.leaf_count(), "merkle tree built");
        }
        self.tree.replace(tree);
        self.tree()
    }

    /// Persist the current root
    pub fn save_root(&self) -> Result<String> {
        let tree = self.tree()?;
        root_store::save_root(&self.config.root_file, &tree)
    }

    /// Compare the current root with the persisted one
    pub fn compare_root(&self) -> Result<RootComparison> {
        let tree = self.tree()?;
        root_store::compare_root(&self.config.root_file, &tree)
    }

    /// Resolve a selector to a record index
    ///
    /// An in-range integer is an index; anything else is matched against
    /// review IDs, first match wins.
    pub fn resolve(&self, selector: &str) -> Result<usize> {
        let selector = selector.trim();
        if let Ok(index) = selector.parse::<usize>() {
            if index < self.records.len() {
                return Ok(index);
            }
        }
        self.records
            .iter()
            .position(|r| r.id == selector)
            .ok_or_else(|| CliError::RecordNotFound(selector.to_string()))
    }

    /// Generate, verify and draw the proof for the selected record
    #[instrument(skip(self))]
    pub fn generate_proof(&self, selector: &str) -> Result<ProofReport> {
        let tree = self.tree()?;
        let index = self.resolve(selector)?;
        let record = &self.records[index];
        let hasher = self.hasher();

        let leaf = record.leaf_digest(&hasher);
        let proof = tree.generate_proof(&leaf)?;
        let root = *tree.root_digest().ok_or(CliError::TreeNotBuilt)?;
        let verified = verify_proof(&hasher, &leaf, &proof, &root);

        let dot_file = if proof.is_empty() {
            None
        } else {
            let path = self.config.proof_dot_file.clone();
            let mut out = BufWriter::new(File::create(&path)?);
            dot::write_proof_dot(&leaf, &proof, &root, &mut out)?;
            out.flush()?;
            self.maybe_render(&path);
            Some(path)
        };

        Ok(ProofReport {
            index,
            record_id: record.id.clone(),
            leaf,
            proof,
            root,
            verified,
            dot_file,
        })
    }

    /// Replace one review's text and rebuild the tree
    #[instrument(skip(self, text))]
    pub fn modify_review(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<ModifyOutcome> {
        if self.records.is_empty() {
            return Err(CliError::NoDataset);
        }
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(CliError::IndexOutOfRange { index, len })?;
        let previous_text = std::mem::replace(&mut record.text, text.into());

        let tree = self.rebuild()?;
        let root = *tree.root_digest().ok_or(CliError::TreeNotBuilt)?;
        Ok(ModifyOutcome {
            previous_text,
            root,
        })
    }

    /// Check that the first record still proves into the current root
    pub fn simulate_tampering(&self) -> Result<TamperStatus> {
        let tree = self.tree()?;
        let record = self.records.first().ok_or(CliError::NoDataset)?;
        let hasher = self.hasher();
        let leaf = record.leaf_digest(&hasher);

        let proof = match tree.generate_proof(&leaf) {
            Ok(proof) => proof,
            Err(e) => {
                warn!(error = %e, "first record is not part of the current tree");
                return Ok(TamperStatus::Tampered);
            }
        };

        let intact = tree
            .root_digest()
            .is_some_and(|root| verify_proof(&hasher, &leaf, &proof, root));
        Ok(if intact {
            TamperStatus::Intact
        } else {
            TamperStatus::Tampered
        })
    }

    /// Write the tree's DOT graph down to `max_levels`
    pub fn visualize_tree(&self, max_levels: usize) -> Result<PathBuf> {
        let tree = self.tree()?;
        let path = self.config.tree_dot_file.clone();
        let mut out = BufWriter::new(File::create(&path)?);
        dot::write_tree_dot(&tree, max_levels, &mut out)?;
        out.flush()?;
        info!("DOT file generated: {}", path.display());
        self.maybe_render(&path);
        Ok(path)
    }

    fn maybe_render(&self, dot_file: &Path) {
        if self.config.render_png {
            dot::render_png(dot_file);
        }
    }
}
