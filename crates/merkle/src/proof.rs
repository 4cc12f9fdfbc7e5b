//! Proof generation and verification.
//!
//! A proof lists one sibling per tree level above the leaf, leaf-level
//! first. Levels where the running node was promoted contribute no step.
//! Each step's position says where the sibling goes when folding:
//!
//! - `left`: `combine(sibling, running)`
//! - `right`: `combine(running, sibling)`

use kolescrow_core::{
    Epoch, EscrowError, HexHash, PoolId, Proof, ProofPosition, ProofStep, Result,
};
use tracing::debug;

use crate::combiner::NodeCombiner;
use crate::leaf::LeafEncoding;
use crate::tree::MerkleTree;

impl MerkleTree {
    /// Sibling path for the record at canonical `index`.
    pub fn proof(&self, index: u64) -> Result<Proof> {
        let count = self.record_count();
        let in_range = usize::try_from(index).map(|i| i < count).unwrap_or(false);
        if !in_range {
            return Err(EscrowError::IndexOutOfRange { index, count });
        }

        let mut proof = Vec::new();
        let mut idx = index as usize;
        for level in self.levels().iter().take_while(|level| level.len() > 1) {
            let sibling = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            if let Some(hash) = level.get(sibling) {
                proof.push(if idx % 2 == 0 {
                    ProofStep::right(hash.clone())
                } else {
                    ProofStep::left(hash.clone())
                });
            }
            idx /= 2;
        }
        Ok(proof)
    }
}

/// Record fields a claimant presents for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafClaim {
    pub account: String,
    pub shares: u128,
    pub amount: u128,
    pub index: u64,
    pub pool_id: PoolId,
    pub epoch: Epoch,
}

impl LeafClaim {
    pub fn leaf(&self, encoding: &LeafEncoding) -> HexHash {
        encoding.encode_parts(
            self.pool_id,
            self.epoch,
            self.index,
            &self.account,
            self.shares,
            self.amount,
        )
    }
}

/// Replay `proof` for `claim` and compare the result to `root`.
///
/// Returns `false` for an empty root, a malformed step hash, or an index
/// that cannot have produced the proof's position sequence.
pub fn verify_proof(
    encoding: &LeafEncoding,
    combiner: &dyn NodeCombiner,
    claim: &LeafClaim,
    proof: &[ProofStep],
    root: &str,
) -> bool {
    if root.is_empty() {
        return false;
    }
    if let Some(step) = proof.iter().find(|step| !combiner.is_node(&step.hash)) {
        debug!("Malformed proof step hash {:?}", step.hash);
        return false;
    }
    if !path_fits_index(claim.index, proof) {
        debug!(
            "Proof of {} steps does not fit index {}",
            proof.len(),
            claim.index
        );
        return false;
    }

    let computed = proof
        .iter()
        .fold(claim.leaf(encoding), |running, step| match step.position {
            ProofPosition::Left => combiner.combine(&step.hash, &running),
            ProofPosition::Right => combiner.combine(&running, &step.hash),
        });
    computed == root
}

/// Whether some tree could yield `proof` for a leaf at `index`.
///
/// Reading the index bits from least significant: a 1 bit is always a
/// `left` step, a 0 bit is a `right` step or, above the leaf level, a
/// promoted level with no step. All bits must be consumed.
pub fn path_fits_index(index: u64, proof: &[ProofStep]) -> bool {
    let mut remaining = index;
    for (level, step) in proof.iter().enumerate() {
        match step.position {
            ProofPosition::Left => {
                if level > 0 {
                    while remaining != 0 && remaining & 1 == 0 {
                        remaining >>= 1;
                    }
                }
                if remaining & 1 != 1 {
                    return false;
                }
            }
            ProofPosition::Right => {
                if remaining & 1 != 0 {
                    return false;
                }
            }
        }
        remaining >>= 1;
    }
    remaining == 0
}
