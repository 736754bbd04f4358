//! Merkle tree construction and lookup

use super::{Node, NodeId};
use crate::Record;
use revtree_crypto::{Digest, Hasher};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// An immutable Merkle tree built from an ordered leaf sequence
///
/// Nodes live in a single arena. Leaves occupy the first `leaf_count`
/// slots in insertion order; internal nodes follow level by level, so the
/// root (if any) is the last node. A record change means building a new
/// tree, never patching this one.
#[derive(Clone, Debug, Default)]
pub struct MerkleTree {
    nodes: Vec<Node>,
    leaf_count: usize,
    root: Option<NodeId>,
    depth: usize,
    /// First leaf index for each digest
    leaf_index: HashMap<Digest, usize>,
}

impl MerkleTree {
    /// Create a tree with no leaves and no root
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a tree from records, hashing each as `H(id ++ text)`
    pub fn from_records<H: Hasher>(hasher: &H, records: &[Record]) -> Self {
        let leaves = records.iter().map(|r| r.leaf_digest(hasher)).collect();
        Self::build(hasher, leaves)
    }

    /// Build a tree from leaf digests
    ///
    /// Each level of `k` nodes yields `ceil(k / 2)` parents. A trailing
    /// unpaired node is promoted with its digest copied unchanged.
    #[instrument(skip(hasher, leaves), fields(leaves = leaves.len()))]
    pub fn build<H: Hasher>(hasher: &H, leaves: Vec<Digest>) -> Self {
        let leaf_count = leaves.len();
        // A full binary tree over n leaves has fewer than 2n nodes
        let mut nodes: Vec<Node> = Vec::with_capacity(leaf_count.saturating_mul(2));
        let mut leaf_index = HashMap::with_capacity(leaf_count);

        for (i, digest) in leaves.into_iter().enumerate() {
            leaf_index.entry(digest).or_insert(i);
            nodes.push(Node::leaf(digest));
        }

        let mut level: Vec<NodeId> = (0..leaf_count).map(NodeId).collect();
        let mut depth = 0;

        while level.len() > 1 {
            let mut parents = Vec::with_capacity(level.len().div_ceil(2));

            for pair in level.chunks(2) {
                let parent_id = NodeId(nodes.len());
                let parent = match *pair {
                    [left, right] => {
                        let digest =
                            hasher.combine(nodes[left.0].digest(), nodes[right.0].digest());
                        nodes[right.0].set_parent(parent_id);
                        Node::internal(digest, left, Some(right))
                    }
                    [only] => Node::internal(*nodes[only.0].digest(), only, None),
                    _ => unreachable!("chunks(2) yields one or two elements"),
                };
                nodes[pair[0].0].set_parent(parent_id);
                nodes.push(parent);
                parents.push(parent_id);
            }

            level = parents;
            depth += 1;
        }

        let root = level.first().copied();
        debug!(nodes = nodes.len(), depth, "built merkle tree");

        Self {
            nodes,
            leaf_count,
            root,
            depth,
            leaf_index,
        }
    }

    /// Root node id, `None` for an empty tree
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Root digest, `None` for an empty tree
    pub fn root_digest(&self) -> Option<&Digest> {
        self.root.map(|id| self.nodes[id.0].digest())
    }

    /// Root digest as lowercase hex, `None` for an empty tree
    pub fn root_hex(&self) -> Option<String> {
        self.root_digest().map(Digest::to_hex)
    }

    /// Compare the root with a persisted hex string, character for character
    ///
    /// Surrounding whitespace in `saved` is ignored. An empty tree never matches.
    pub fn matches_root_hex(&self, saved: &str) -> bool {
        self.root_hex()
            .is_some_and(|root| root.as_str() == saved.trim())
    }

    /// Get a node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a node by id, `None` if out of range
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Leaf nodes in insertion order
    pub fn leaves(&self) -> &[Node] {
        &self.nodes[..self.leaf_count]
    }

    /// Id of the leaf at `index`
    pub fn leaf_id(&self, index: usize) -> Option<NodeId> {
        (index < self.leaf_count).then_some(NodeId(index))
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of nodes, leaves included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels above the leaves: `ceil(log2(n))` for `n > 1`, else 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Check if the tree has no leaves
    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Find the first leaf (in insertion order) with the given digest
    ///
    /// Duplicate records share a digest; only the first is reachable this way.
    pub fn find_leaf(&self, digest: &Digest) -> Option<NodeId> {
        self.leaf_position(digest).map(NodeId)
    }

    /// Insertion index of the first leaf with the given digest
    pub fn leaf_position(&self, digest: &Digest) -> Option<usize> {
        self.leaf_index.get(digest).copied()
    }

    /// Iterate over all nodes with their ids, leaves first
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtree_crypto::{Blake3Hasher, Sha256Hasher};
    use rstest::rstest;

    fn leaves(n: usize) -> Vec<Digest> {
        (0..n)
            .map(|i| Sha256Hasher.leaf(&format!("r{}", i), &format!("review text {}", i)))
            .collect()
    }

    #[test_log::test]
    fn test_empty_tree_has_no_root() {
        let tree = MerkleTree::build(&Sha256Hasher, Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.root_hex(), None);
        assert_eq!(tree.node_count(), 0);
        assert!(!tree.matches_root_hex(""));
    }

    #[test_log::test]
    fn test_single_leaf_is_root() {
        let l = leaves(1);
        let tree = MerkleTree::build(&Sha256Hasher, l.clone());
        assert_eq!(tree.root(), Some(NodeId(0)));
        assert_eq!(tree.root_digest(), Some(&l[0]));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test_log::test]
    fn test_three_leaf_scenario() {
        let hasher = Sha256Hasher;
        let l = leaves(3);
        let tree = MerkleTree::build(&hasher, l.clone());

        let p1 = hasher.combine(&l[0], &l[1]);
        let p2 = l[2];
        let root = hasher.combine(&p1, &p2);

        assert_eq!(tree.root_digest(), Some(&root));
        assert_eq!(tree.node_count(), 6);

        let promoted = tree.node(NodeId(4));
        assert!(promoted.is_pass_through());
        assert_eq!(promoted.digest(), &l[2]);
        assert_eq!(tree.node(NodeId(2)).parent(), Some(NodeId(4)));
    }

    #[test_log::test]
    fn test_parent_links_and_children() {
        let tree = MerkleTree::build(&Sha256Hasher, leaves(5));
        let root = tree.root().unwrap();
        assert!(tree.node(root).is_root());

        for (id, node) in tree.iter() {
            for child in node.children() {
                assert_eq!(tree.node(child).parent(), Some(id));
            }
            if id != root {
                assert!(node.parent().is_some());
            }
        }
    }

    #[rstest]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(4, 2)]
    #[case(5, 3)]
    #[case(8, 3)]
    #[case(9, 4)]
    #[case(1000, 10)]
    fn test_depth_is_ceil_log2(#[case] n: usize, #[case] depth: usize) {
        let tree = MerkleTree::build(&Sha256Hasher, leaves(n));
        assert_eq!(tree.depth(), depth);
        assert_eq!(tree.leaf_count(), n);
    }

    #[test_log::test]
    fn test_build_is_deterministic() {
        let a = MerkleTree::build(&Sha256Hasher, leaves(17));
        let b = MerkleTree::build(&Sha256Hasher, leaves(17));
        assert_eq!(a.root_digest(), b.root_digest());
    }

    #[test_log::test]
    fn test_hasher_changes_root() {
        let records = vec![Record::new("a", "1"), Record::new("b", "2")];
        let sha = MerkleTree::from_records(&Sha256Hasher, &records);
        let blake = MerkleTree::from_records(&Blake3Hasher, &records);
        assert_ne!(sha.root_digest(), blake.root_digest());
    }

    #[test_log::test]
    fn test_text_change_changes_root() {
        let mut records: Vec<Record> = (0..7)
            .map(|i| Record::new(format!("id{}", i), format!("text {}", i)))
            .collect();
        let before = MerkleTree::from_records(&Sha256Hasher, &records);
        records[6].text.push('!');
        let after = MerkleTree::from_records(&Sha256Hasher, &records);
        assert_ne!(before.root_digest(), after.root_digest());
    }

    #[test_log::test]
    fn test_find_leaf_first_match_wins() {
        let records = vec![
            Record::new("dup", "same"),
            Record::new("other", "x"),
            Record::new("dup", "same"),
        ];
        let tree = MerkleTree::from_records(&Sha256Hasher, &records);
        let digest = records[0].leaf_digest(&Sha256Hasher);
        assert_eq!(tree.find_leaf(&digest), Some(NodeId(0)));
        assert_eq!(tree.leaf_position(&digest), Some(0));
        assert_eq!(tree.find_leaf(&Sha256Hasher.hash(b"absent")), None);
    }

    #[test_log::test]
    fn test_matches_root_hex() {
        let tree = MerkleTree::build(&Sha256Hasher, leaves(4));
        let hex = tree.root_hex().unwrap();
        assert!(tree.matches_root_hex(&hex));
        assert!(tree.matches_root_hex(&format!("{}\n", hex)));
        assert!(!tree.matches_root_hex(&hex.to_uppercase()));
        assert!(!tree.matches_root_hex(&hex[1..]));
    }

    #[test_log::test]
    fn test_leaf_accessors() {
        let l = leaves(3);
        let tree = MerkleTree::build(&Sha256Hasher, l.clone());
        assert_eq!(tree.leaves().len(), 3);
        assert_eq!(tree.leaves()[1].digest(), &l[1]);
        assert_eq!(tree.leaf_id(2), Some(NodeId(2)));
        assert_eq!(tree.leaf_id(3), None);
        assert!(tree.get(NodeId(99)).is_none());
    }
}
