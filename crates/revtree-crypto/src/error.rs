//! Error types for the revtree-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur while handling digests
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Digest has the wrong length
    #[error("invalid digest: expected {expected} bytes, got {actual}")]
    InvalidDigest { expected: usize, actual: usize },

    /// Hex decode error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Unknown hash algorithm name
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}
