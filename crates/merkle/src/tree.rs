//! Distribution tree builder.
//!
//! Leaves are padded to an even count by duplicating the last leaf. Above
//! the leaf level, a level with an odd count promotes its lone last node
//! unchanged instead of pairing it with itself. Every implementation that
//! must agree on the root follows exactly this rule.

use kolescrow_core::{Epoch, HexHash, PoolId};
use tracing::debug;

use crate::combiner::NodeCombiner;
use crate::leaf::LeafEncoding;
use crate::ordering::CanonicalSet;

/// Immutable Merkle tree over one (pool, epoch) snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerkleTree {
    /// `levels[0]` is the padded leaf level, the last level holds the root.
    /// Empty when there are no records.
    levels: Vec<Vec<HexHash>>,
    /// Leaves before padding
    record_count: usize,
}

impl MerkleTree {
    /// Encode every record in canonical order and build the tree.
    pub fn build(
        records: &CanonicalSet,
        pool_id: PoolId,
        epoch: Epoch,
        encoding: &LeafEncoding,
        combiner: &dyn NodeCombiner,
    ) -> Self {
        let leaves = records
            .iter()
            .enumerate()
            .map(|(position, record)| encoding.encode(pool_id, epoch, position as u64, record))
            .collect();
        let tree = Self::from_leaves(leaves, combiner);
        debug!(
            "Built tree for pool {} epoch {}: {} records, {} levels, root {} ({})",
            pool_id,
            epoch,
            tree.record_count,
            tree.levels.len(),
            tree.root().get(..16).unwrap_or(""),
            combiner.name(),
        );
        tree
    }

    /// Build from already-encoded leaves in canonical order.
    pub fn from_leaves(mut leaves: Vec<HexHash>, combiner: &dyn NodeCombiner) -> Self {
        let record_count = leaves.len();
        if leaves.is_empty() {
            return Self::default();
        }

        if let Some(last) = leaves.last().cloned().filter(|_| record_count % 2 == 1) {
            leaves.push(last);
        }

        let mut current = leaves;
        let mut levels = Vec::new();
        while current.len() > 1 {
            let next: Vec<HexHash> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => combiner.combine(left, right),
                    // Odd level: promote the lone node unchanged
                    _ => pair[0].clone(),
                })
                .collect();
            levels.push(current);
            current = next;
        }
        levels.push(current);

        Self {
            levels,
            record_count,
        }
    }

    /// Merkle root, or `""` when the distribution is empty
    pub fn root(&self) -> &str {
        self.levels
            .last()
            .and_then(|level| level.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Padded leaf level
    pub fn leaves(&self) -> &[HexHash] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every level from the padded leaves up to the root
    pub fn levels(&self) -> &[Vec<HexHash>] {
        &self.levels
    }

    /// Number of records the tree commits to (before padding)
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
