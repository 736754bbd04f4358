//! Persisted root digest
//!
//! The file holds exactly the root hex string, with no trailing newline.

use crate::{CliError, Result};
use revtree_core::MerkleTree;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// Outcome of comparing the current root with a saved one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootComparison {
    /// Roots are identical
    Match,
    /// Roots differ
    Mismatch,
}

impl RootComparison {
    /// Whether the roots matched
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Write the tree's root hex to `path`
pub fn save_root(path: &Path, tree: &MerkleTree) -> Result<String> {
    let root = tree.root_hex().ok_or(CliError::TreeNotBuilt)?;
    fs::write(path, &root)?;
    info!(root = %root, "saved merkle root to {}", path.display());
    Ok(root)
}

/// Read the first whitespace-delimited token of the root file
pub fn load_root(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(CliError::NoSavedRoot(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// Compare the tree's root with the one saved at `path`
pub fn compare_root(path: &Path, tree: &MerkleTree) -> Result<RootComparison> {
    let saved = load_root(path)?;
    Ok(if tree.matches_root_hex(&saved) {
        RootComparison::Match
    } else {
        RootComparison::Mismatch
    })
}
