//! Inclusion proofs

use super::MerkleTree;
use crate::{CoreError, Result};
use revtree_crypto::{Digest, Hasher};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Which operand the sibling was when its parent digest was computed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sibling is the left operand: `H(sibling ++ acc)`
    Left,
    /// Sibling is the right operand: `H(acc ++ sibling)`
    Right,
}

/// One level of an inclusion proof
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Digest of the sibling node
    pub sibling: Digest,
    /// Side the sibling occupies
    pub side: Side,
}

impl ProofStep {
    /// Create a new step
    pub fn new(sibling: Digest, side: Side) -> Self {
        Self { sibling, side }
    }

    /// Fold one level: combine the running digest with the sibling
    pub fn apply<H: Hasher>(&self, hasher: &H, acc: &Digest) -> Digest {
        match self.side {
            Side::Left => hasher.combine(&self.sibling, acc),
            Side::Right => hasher.combine(acc, &self.sibling),
        }
    }
}

/// Sibling path from a leaf up to the root, read leaf-to-root
///
/// Promoted levels contribute no step, so a proof can be shorter than the
/// tree's depth.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof {
    steps: Vec<ProofStep>,
}

impl Proof {
    /// Create a proof from its steps
    pub fn new(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }

    /// The steps, leaf first
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for a single-leaf tree's proof
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over the steps
    pub fn iter(&self) -> std::slice::Iter<'_, ProofStep> {
        self.steps.iter()
    }

    /// Recompute the root from `leaf` along this path
    pub fn compute_root<H: Hasher>(&self, hasher: &H, leaf: &Digest) -> Digest {
        self.steps
            .iter()
            .fold(*leaf, |acc, step| step.apply(hasher, &acc))
    }

    /// Check this proof against a claimed root
    pub fn verify<H: Hasher>(&self, hasher: &H, leaf: &Digest, root: &Digest) -> bool {
        verify_proof(hasher, leaf, self, root)
    }
}

impl<'a> IntoIterator for &'a Proof {
    type Item = &'a ProofStep;
    type IntoIter = std::slice::Iter<'a, ProofStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl From<Vec<ProofStep>> for Proof {
    fn from(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }
}

impl MerkleTree {
    /// Generate the inclusion proof for the first leaf with `leaf` as digest
    ///
    /// Walks parent links from the leaf to the root. A node that is the only
    /// child of a promoted parent adds nothing at that level.
    #[instrument(skip(self, leaf), fields(leaf = %leaf.short(16)))]
    pub fn generate_proof(&self, leaf: &Digest) -> Result<Proof> {
        if self.is_empty() {
            return Err(CoreError::EmptyTree);
        }
        let mut current = self
            .find_leaf(leaf)
            .ok_or(CoreError::LeafNotFound(*leaf))?;

        let mut steps = Vec::with_capacity(self.depth());
        while let Some(parent_id) = self.node(current).parent() {
            let parent = self.node(parent_id);
            if parent.left() == Some(current) {
                if let Some(right) = parent.right() {
                    steps.push(ProofStep::new(*self.node(right).digest(), Side::Right));
                }
            } else if let Some(left) = parent.left() {
                steps.push(ProofStep::new(*self.node(left).digest(), Side::Left));
            }
            current = parent_id;
        }

        debug!(steps = steps.len(), "generated proof");
        Ok(Proof::new(steps))
    }
}

/// Verify an inclusion proof
///
/// Folds the steps over `leaf` and compares the result with `root`. Only a
/// yes/no answer is given; a mismatch does not say which level failed.
pub fn verify_proof<H: Hasher>(hasher: &H, leaf: &Digest, proof: &Proof, root: &Digest) -> bool {
    proof.compute_root(hasher, leaf) == *root
}

/// Verify an inclusion proof given hex-encoded leaf and root
///
/// Unparsable hex never verifies.
pub fn verify_proof_hex<H: Hasher>(hasher: &H, leaf: &str, proof: &Proof, root: &str) -> bool {
    match (Digest::from_hex(leaf.trim()), Digest::from_hex(root.trim())) {
        (Ok(leaf), Ok(root)) => verify_proof(hasher, &leaf, proof, &root),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use proptest::prelude::*;
    use revtree_crypto::Sha256Hasher;
    use rstest::rstest;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(format!("R{:04}", i), format!("review number {}", i)))
            .collect()
    }

    #[test]
    fn test_single_leaf_empty_proof() {
        let recs = records(1);
        let tree = MerkleTree::from_records(&Sha256Hasher, &recs);
        let leaf = recs[0].leaf_digest(&Sha256Hasher);

        let proof = tree.generate_proof(&leaf).unwrap();
        assert!(proof.is_empty());
        assert!(verify_proof(&Sha256Hasher, &leaf, &proof, tree.root_digest().unwrap()));
    }

    #[test]
    fn test_three_leaf_scenario_proof() {
        let hasher = Sha256Hasher;
        let recs = records(3);
        let l: Vec<Digest> = recs.iter().map(|r| r.leaf_digest(&hasher)).collect();
        let tree = MerkleTree::from_records(&hasher, &recs);
        let p1 = hasher.combine(&l[0], &l[1]);
        let root = *tree.root_digest().unwrap();

        let proof = tree.generate_proof(&l[2]).unwrap();
        assert_eq!(proof.steps(), &[ProofStep::new(p1, Side::Left)]);
        assert_eq!(hasher.combine(&p1, &l[2]), root);
        assert!(proof.verify(&hasher, &l[2], &root));

        let proof0 = tree.generate_proof(&l[0]).unwrap();
        assert_eq!(
            proof0.steps(),
            &[
                ProofStep::new(l[1], Side::Right),
                ProofStep::new(l[2], Side::Right)
            ]
        );
    }

    #[test]
    fn test_promoted_levels_shorten_proof() {
        // 5 leaves: the last leaf is promoted twice before meeting a sibling
        let recs = records(5);
        let tree = MerkleTree::from_records(&Sha256Hasher, &recs);
        assert_eq!(tree.depth(), 3);

        let last = recs[4].leaf_digest(&Sha256Hasher);
        let proof = tree.generate_proof(&last).unwrap();
        assert_eq!(proof.len(), 1);
        assert_eq!(proof.steps()[0].side, Side::Left);

        let first = recs[0].leaf_digest(&Sha256Hasher);
        assert_eq!(tree.generate_proof(&first).unwrap().len(), 3);
    }

    #[test]
    fn test_not_found() {
        let tree = MerkleTree::from_records(&Sha256Hasher, &records(4));
        let missing = Sha256Hasher.hash(b"not a leaf");
        assert!(matches!(
            tree.generate_proof(&missing),
            Err(CoreError::LeafNotFound(d)) if d == missing
        ));
    }

    #[test]
    fn test_empty_tree_has_no_proof() {
        let tree = MerkleTree::empty();
        assert!(matches!(
            tree.generate_proof(&Sha256Hasher.hash(b"x")),
            Err(CoreError::EmptyTree)
        ));
    }

    #[test]
    fn test_tampered_leaf_fails() {
        let recs = records(8);
        let tree = MerkleTree::from_records(&Sha256Hasher, &recs);
        let leaf = recs[3].leaf_digest(&Sha256Hasher);
        let proof = tree.generate_proof(&leaf).unwrap();
        let root = tree.root_digest().unwrap();

        let forged = Record::new("R0003", "review number 3, edited").leaf_digest(&Sha256Hasher);
        assert!(!verify_proof(&Sha256Hasher, &forged, &proof, root));

        let mut steps = proof.steps().to_vec();
        steps[1].side = match steps[1].side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        assert!(!verify_proof(&Sha256Hasher, &leaf, &Proof::from(steps), root));
    }

    #[rstest]
    #[case("zz", false)]
    #[case("", false)]
    fn test_verify_hex_rejects_garbage(#[case] leaf: &str, #[case] expected: bool) {
        let tree = MerkleTree::from_records(&Sha256Hasher, &records(2));
        let root = tree.root_hex().unwrap();
        assert_eq!(
            verify_proof_hex(&Sha256Hasher, leaf, &Proof::default(), &root),
            expected
        );
    }

    #[test]
    fn test_verify_hex_roundtrip() {
        let recs = records(6);
        let tree = MerkleTree::from_records(&Sha256Hasher, &recs);
        let leaf = recs[5].leaf_digest(&Sha256Hasher);
        let proof = tree.generate_proof(&leaf).unwrap();
        assert!(verify_proof_hex(
            &Sha256Hasher,
            &leaf.to_hex(),
            &proof,
            &format!("{}\n", tree.root_hex().unwrap())
        ));
    }

    #[test]
    fn test_proof_serializes_as_step_list() {
        let recs = records(2);
        let tree = MerkleTree::from_records(&Sha256Hasher, &recs);
        let leaf = recs[0].leaf_digest(&Sha256Hasher);
        let proof = tree.generate_proof(&leaf).unwrap();

        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json[0]["side"], "right");
        assert_eq!(json[0]["sibling"], recs[1].leaf_digest(&Sha256Hasher).to_hex());

        let back: Proof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
    }

    proptest! {
        #[test]
        fn prop_every_leaf_verifies(n in 1usize..70) {
            let recs = records(n);
            let tree = MerkleTree::from_records(&Sha256Hasher, &recs);
            let root = *tree.root_digest().unwrap();
            for record in &recs {
                let leaf = record.leaf_digest(&Sha256Hasher);
                let proof = tree.generate_proof(&leaf).unwrap();
                prop_assert!(proof.len() <= tree.depth());
                prop_assert!(verify_proof(&Sha256Hasher, &leaf, &proof, &root));
            }
        }

        #[test]
        fn prop_build_is_deterministic(texts in proptest::collection::vec(".{0,24}", 0..40)) {
            let recs: Vec<Record> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| Record::new(i.to_string(), t.clone()))
                .collect();
            let a = MerkleTree::from_records(&Sha256Hasher, &recs);
            let b = MerkleTree::from_records(&Sha256Hasher, &recs);
            prop_assert_eq!(a.root_digest(), b.root_digest());
        }
    }
}
