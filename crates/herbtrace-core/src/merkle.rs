//! Merkle aggregation over ordered records.
//!
//! Leaves are `sha256(canonical_bytes(item))`. Each level hashes the ASCII
//! concatenation of adjacent hex digests; an odd trailing digest is paired
//! with itself.

use herbtrace_canonical::{canonical_bytes, sha256_hex, HashString};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::model::ProvenanceRecord;

/// Leaf digest of a single item.
pub fn leaf_hash<T: Serialize + ?Sized>(item: &T) -> Result<HashString, CoreError> {
    let bytes = canonical_bytes(item)?;
    Ok(sha256_hex(&[&bytes]))
}

fn hash_pair(left: &HashString, right: &HashString) -> HashString {
    sha256_hex(&[left.as_str().as_bytes(), right.as_str().as_bytes()])
}

fn leaves<T: Serialize>(items: &[T]) -> Result<Vec<HashString>, CoreError> {
    items.iter().map(leaf_hash).collect()
}

fn next_level(level: &[HashString]) -> Vec<HashString> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            hash_pair(left, right)
        })
        .collect()
}

/// Root over precomputed leaf digests. Empty input gives the empty hash.
pub fn root_from_leaves(mut level: Vec<HashString>) -> HashString {
    while level.len() > 1 {
        level = next_level(&level);
    }
    level.pop().unwrap_or_default()
}

/// Merkle root of `items` in order.
pub fn merkle_root<T: Serialize>(items: &[T]) -> Result<HashString, CoreError> {
    Ok(root_from_leaves(leaves(items)?))
}

/// Batch commitment over a product's provenance records.
pub fn provenance_root(records: &[ProvenanceRecord]) -> Result<HashString, CoreError> {
    merkle_root(records)
}

/// Which side a sibling sits on when folding a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sibling is hashed before the running digest.
    Left,
    /// Sibling is hashed after the running digest.
    Right,
}

/// One sibling on the path from a leaf to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Sibling digest.
    pub hash: HashString,
    /// Sibling position.
    pub side: Side,
}

/// Inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Leaf position in the original sequence.
    pub leaf_index: usize,
    /// Siblings from the leaf level upwards.
    pub steps: Vec<ProofStep>,
}

impl MerkleProof {
    /// Folds the proof from `leaf` and compares against `root`.
    pub fn verify(&self, leaf: &HashString, root: &HashString) -> bool {
        let folded = self.steps.iter().fold(leaf.clone(), |acc, step| match step.side {
            Side::Left => hash_pair(&step.hash, &acc),
            Side::Right => hash_pair(&acc, &step.hash),
        });
        &folded == root
    }
}

/// Inclusion proof for `items[index]`, or `None` when out of range.
pub fn merkle_proof<T: Serialize>(
    items: &[T],
    index: usize,
) -> Result<Option<MerkleProof>, CoreError> {
    if index >= items.len() {
        return Ok(None);
    }

    let mut level = leaves(items)?;
    let mut position = index;
    let mut steps = Vec::new();

    while level.len() > 1 {
        let (sibling, side) = if position % 2 == 0 {
            (level.get(position + 1).unwrap_or(&level[position]), Side::Right)
        } else {
            (&level[position - 1], Side::Left)
        };
        steps.push(ProofStep {
            hash: sibling.clone(),
            side,
        });
        level = next_level(&level);
        position /= 2;
    }

    Ok(Some(MerkleProof {
        leaf_index: index,
        steps,
    }))
}
