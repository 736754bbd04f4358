//! # Revtree Core
//!
//! Core engine for fingerprinting an ordered set of text records.
//!
//! This crate provides:
//! - **Records**: `(id, text)` pairs and their leaf digests
//! - **Merkle Tree**: pairwise construction with a single root digest
//! - **Inclusion Proofs**: sibling paths from a leaf to the root, and their verification
//! - **Shared Snapshots**: an atomically swappable handle for hosts that rebuild while reading
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Records (id, text), ordered      │
//! ├─────────────────────────────────────────┤
//! │   Leaf digests  H(id ++ text)           │
//! ├─────────────────────────────────────────┤
//! │   MerkleTree (node arena + root)        │
//! ├─────────────────────────────────────────┤
//! │   Proof generation │ Proof verification │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The core does no I/O. Loading records, persisting roots and rendering
//! graphs belong to the caller.

pub mod error;
pub mod merkle;
pub mod record;
pub mod shared;

pub use error::{CoreError, Result};
pub use merkle::{verify_proof, verify_proof_hex, MerkleTree, Node, NodeId, Proof, ProofStep, Side};
pub use record::Record;
pub use shared::SharedTree;

pub use revtree_crypto::{Digest, HashAlgorithm, Hasher};
