//! Merkle tree over ordered leaf digests
//!
//! Construction combines each level pairwise, left to right, until one node
//! remains:
//! - Two siblings produce a parent `H(hex(left) ++ hex(right))`
//! - A trailing unpaired node is *promoted*: its parent copies the child's
//!   digest verbatim and has no right child
//!
//! A promoted parent is indistinguishable from its child at the hash level,
//! so proofs passing through it carry no step for that level. This is weaker
//! than the duplicate-and-rehash rule used by Bitcoin-style trees and is kept
//! on purpose for compatibility with existing roots.

mod node;
mod proof;
mod tree;

pub use node::{Node, NodeId};
pub use proof::{verify_proof, verify_proof_hex, Proof, ProofStep, Side};
pub use tree::MerkleTree;
