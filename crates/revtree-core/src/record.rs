//! Input records

use revtree_crypto::{Digest, Hasher};
use serde::{Deserialize, Serialize};

/// One input record, e.g. a review
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier
    pub id: String,
    /// Record body
    pub text: String,
}

impl Record {
    /// Create a new record
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Leaf digest: `H(id ++ text)`
    pub fn leaf_digest<H: Hasher>(&self, hasher: &H) -> Digest {
        hasher.leaf(&self.id, &self.text)
    }
}
