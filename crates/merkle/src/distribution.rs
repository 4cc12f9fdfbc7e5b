use std::fmt;

use kolescrow_core::{
    DistributionRecord, Epoch, EscrowError, HexHash, PoolId, Proof, ProofStep, Result,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::combiner::{NodeCombiner, Sha256Combiner};
use crate::leaf::LeafEncoding;
use crate::ordering::CanonicalSet;
use crate::proof::{verify_proof, LeafClaim};
use crate::tree::MerkleTree;

/// Merkle distribution for one pool epoch (ready for on-chain posting)
#[derive(Debug, Clone)]
pub struct Distribution {
    pub pool_id: PoolId,
    pub epoch: Epoch,
    /// Records in canonical order
    pub records: CanonicalSet,
    /// Sum of shares across all records
    pub total_shares: u128,
    /// Sum of amounts across all records
    pub total_amount: u128,
    tree: MerkleTree,
}

/// One account's membership proof within a [`Distribution`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountProof {
    pub account: String,
    pub index: u64,
    pub leaf: HexHash,
    pub proof: Proof,
    pub shares: u128,
    pub amount: u128,
}

impl Distribution {
    /// Merkle root, `""` for an empty distribution
    pub fn root(&self) -> &str {
        self.tree.root()
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Padded leaf hashes in canonical order
    pub fn leaves(&self) -> &[HexHash] {
        self.tree.leaves()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Generate a Merkle proof for a specific account.
    ///
    /// Returns `AccountNotFound` if the account is not in the distribution.
    pub fn proof_for_account(&self, account: &str) -> Result<AccountProof> {
        let position = self
            .records
            .position_of(account)
            .ok_or_else(|| EscrowError::AccountNotFound(account.to_string()))?;
        let record = self
            .records
            .get(position)
            .ok_or_else(|| EscrowError::AccountNotFound(account.to_string()))?;
        let index = position as u64;
        let proof = self.tree.proof(index)?;
        let leaf = self.tree.leaves()[position].clone();

        Ok(AccountProof {
            account: record.account.clone(),
            index,
            leaf,
            proof,
            shares: record.shares,
            amount: record.amount,
        })
    }
}

/// Builds distributions and checks proofs with one leaf encoding and combiner.
pub struct Distributor {
    encoding: LeafEncoding,
    combiner: Box<dyn NodeCombiner>,
}

impl Distributor {
    /// Create a distributor with a specific node combiner
    pub fn new(encoding: LeafEncoding, combiner: Box<dyn NodeCombiner>) -> Self {
        Self { encoding, combiner }
    }

    pub fn encoding(&self) -> &LeafEncoding {
        &self.encoding
    }

    pub fn combiner(&self) -> &dyn NodeCombiner {
        self.combiner.as_ref()
    }

    /// Build the distribution for `pool_id` / `epoch`.
    ///
    /// Rejects malformed or duplicate accounts and totals that overflow.
    pub fn build(
        &self,
        records: Vec<DistributionRecord>,
        pool_id: PoolId,
        epoch: Epoch,
    ) -> Result<Distribution> {
        let records = CanonicalSet::from_records(records)?;

        let mut total_shares: u128 = 0;
        let mut total_amount: u128 = 0;
        for record in records.iter() {
            total_shares = total_shares
                .checked_add(record.shares)
                .ok_or(EscrowError::TotalOverflow("shares"))?;
            total_amount = total_amount
                .checked_add(record.amount)
                .ok_or(EscrowError::TotalOverflow("amount"))?;
        }

        let tree = MerkleTree::build(&records, pool_id, epoch, &self.encoding, self.combiner());
        if tree.is_empty() {
            debug!("Pool {} epoch {} has no records", pool_id, epoch);
        }

        Ok(Distribution {
            pool_id,
            epoch,
            records,
            total_shares,
            total_amount,
            tree,
        })
    }

    /// Check a claim against `root`. A proof that does not verify is `false`.
    pub fn verify(&self, claim: &LeafClaim, proof: &[ProofStep], root: &str) -> bool {
        let valid = verify_proof(&self.encoding, self.combiner(), claim, proof, root);
        if !valid {
            warn!(
                "Proof for {} at index {} (pool {} epoch {}) does not verify",
                claim.account, claim.index, claim.pool_id, claim.epoch
            );
        }
        valid
    }
}

impl Default for Distributor {
    fn default() -> Self {
        Self::new(LeafEncoding::default(), Box::new(Sha256Combiner))
    }
}

impl fmt::Debug for Distributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Distributor")
            .field("encoding", &self.encoding)
            .field("combiner", &self.combiner.name())
            .finish()
    }
}
