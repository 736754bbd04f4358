//! Shared tree snapshots for concurrent hosts
//!
//! Trees are immutable once built. A host that rebuilds while other threads
//! read swaps the whole tree in one step; readers holding an older snapshot
//! keep using it until they drop it.

use crate::MerkleTree;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Single-writer / multi-reader holder for the current tree
#[derive(Debug, Default)]
pub struct SharedTree {
    current: RwLock<Option<Arc<MerkleTree>>>,
}

impl SharedTree {
    /// Create an empty holder (no tree built yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder around an already built tree
    pub fn with_tree(tree: MerkleTree) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(tree))),
        }
    }

    /// Swap in a fully built tree, returning the previous one
    pub fn replace(&self, tree: MerkleTree) -> Option<Arc<MerkleTree>> {
        let next = Arc::new(tree);
        debug!(leaves = next.leaf_count(), "swapping in rebuilt tree");
        self.current.write().replace(next)
    }

    /// The current tree, if one has been built
    pub fn snapshot(&self) -> Option<Arc<MerkleTree>> {
        self.current.read().clone()
    }

    /// Drop the current tree
    pub fn clear(&self) -> Option<Arc<MerkleTree>> {
        self.current.write().take()
    }

    /// Whether a tree has been built
    pub fn is_built(&self) -> bool {
        self.current.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use revtree_crypto::Sha256Hasher;
    use std::sync::Barrier;
    use std::thread;

    fn tree(texts: &[&str]) -> MerkleTree {
        let records: Vec<Record> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Record::new(i.to_string(), *t))
            .collect();
        MerkleTree::from_records(&Sha256Hasher, &records)
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedTree::with_tree(tree(&["a", "b"]));
        let old = shared.snapshot().unwrap();
        let old_root = *old.root_digest().unwrap();

        let prev = shared.replace(tree(&["a", "c"])).unwrap();
        assert_eq!(prev.root_digest(), Some(&old_root));

        // The reader's snapshot is untouched by the swap
        assert_eq!(old.root_digest(), Some(&old_root));
        assert_ne!(shared.snapshot().unwrap().root_digest(), Some(&old_root));
    }

    #[test]
    fn test_empty_and_clear() {
        let shared = SharedTree::new();
        assert!(!shared.is_built());
        assert!(shared.snapshot().is_none());

        shared.replace(tree(&["x"]));
        assert!(shared.is_built());
        assert!(shared.clear().is_some());
        assert!(!shared.is_built());
    }

    #[test]
    fn test_concurrent_readers_keep_their_snapshot() {
        const READERS: usize = 4;
        let shared = Arc::new(SharedTree::with_tree(tree(&["a", "b", "c"])));
        let snapshotted = Arc::new(Barrier::new(READERS + 1));
        let swapped = Arc::new(Barrier::new(READERS + 1));

        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let snapshotted = Arc::clone(&snapshotted);
                let swapped = Arc::clone(&swapped);
                thread::spawn(move || {
                    let snap = shared.snapshot().unwrap();
                    snapshotted.wait();
                    swapped.wait();

                    // The shared tree has moved on; this snapshot has not
                    assert_eq!(shared.snapshot().unwrap().leaf_count(), 1);
                    assert_eq!(snap.leaf_count(), 3);
                    let leaf = *snap.leaves()[2].digest();
                    let proof = snap.generate_proof(&leaf).unwrap();
                    proof.verify(&Sha256Hasher, &leaf, snap.root_digest().unwrap())
                })
            })
            .collect();

        snapshotted.wait();
        shared.replace(tree(&["d"]));
        swapped.wait();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
