//! Error types for the revtree-core crate

use revtree_crypto::Digest;
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in tree operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// No leaf carries the requested digest
    #[error("leaf not found: {0}")]
    LeafNotFound(Digest),

    /// The tree was built from zero records
    #[error("tree is empty")]
    EmptyTree,

    /// Crypto error
    #[error("crypto error: {0}")]
    Crypto(#[from] revtree_crypto::CryptoError),
}
