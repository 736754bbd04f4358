//! Merkle tree node types

use revtree_crypto::Digest;
use std::fmt;

/// Index of a node inside its tree's arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// A vertex of the tree
///
/// Children are owned through the tree's arena. `parent` is a plain index
/// used only for upward walks during proof generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    digest: Digest,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    /// Create a leaf node
    pub(crate) fn leaf(digest: Digest) -> Self {
        Self {
            digest,
            left: None,
            right: None,
            parent: None,
        }
    }

    /// Create an internal node; `right` is `None` for a promoted node
    pub(crate) fn internal(digest: Digest, left: NodeId, right: Option<NodeId>) -> Self {
        Self {
            digest,
            left: Some(left),
            right,
            parent: None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }

    /// The node's digest
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Left child
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child, absent for leaves and promoted nodes
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Parent, absent for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether this node was derived directly from a record
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Whether this node copies its single child's digest
    pub fn is_pass_through(&self) -> bool {
        self.left.is_some() && self.right.is_none()
    }

    /// Whether this node is the root
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child ids in left-to-right order
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.left.iter().chain(self.right.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtree_crypto::{Hasher, Sha256Hasher};

    #[test]
    fn test_node_kinds() {
        let d = Sha256Hasher.hash(b"x");
        let leaf = Node::leaf(d);
        assert!(leaf.is_leaf());
        assert!(!leaf.is_pass_through());
        assert!(leaf.is_root());
        assert_eq!(leaf.children().count(), 0);

        let promoted = Node::internal(d, NodeId(0), None);
        assert!(promoted.is_pass_through());
        assert!(!promoted.is_leaf());
        assert_eq!(promoted.children().collect::<Vec<_>>(), vec![NodeId(0)]);

        let mut full = Node::internal(d, NodeId(0), Some(NodeId(1)));
        full.set_parent(NodeId(5));
        assert!(!full.is_pass_through());
        assert_eq!(full.parent(), Some(NodeId(5)));
        assert_eq!(full.children().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1)]);
    }
}
