//! # Revtree Crypto
//!
//! Hash primitives for the revtree record-fingerprinting system.
//!
//! This crate provides:
//! - **Digest**: a fixed 256-bit hash value with hex encoding
//! - **Hasher**: the opaque `H(bytes) -> digest` function the tree is built on
//! - **SHA-256 / BLAKE3**: the two supported hash functions
//!
//! ## Example
//!
//! ```rust
//! use revtree_crypto::{Hasher, Sha256Hasher};
//!
//! let hasher = Sha256Hasher;
//! let leaf = hasher.leaf("r1", "great product");
//! assert_eq!(leaf.to_hex().len(), 64);
//! ```

pub mod error;
pub mod hashing;

pub use error::{CryptoError, Result};
pub use hashing::{
    Blake3Hasher, Digest, HashAlgorithm, Hasher, Sha256Hasher, DIGEST_BYTE_SIZE, DIGEST_HEX_LEN,
};
