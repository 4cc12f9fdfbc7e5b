use serde::{Deserialize, Serialize};

use crate::{EscrowError, Result};

/// Reward pool identifier
pub type PoolId = u64;

/// Distribution epoch within a pool
pub type Epoch = u64;

/// Lowercase hex SHA-256 digest as carried on the wire
pub type HexHash = String;

/// One account's share of a pool distribution.
///
/// Supplied by the pool service; never mutated once built into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistributionRecord {
    /// Account address (string form, compared byte-wise)
    pub account: String,
    /// Shares earned in the epoch
    pub shares: u128,
    /// Amount to distribute
    pub amount: u128,
}

impl DistributionRecord {
    pub fn new(account: impl Into<String>, shares: u128, amount: u128) -> Self {
        Self {
            account: account.into(),
            shares,
            amount,
        }
    }
}

/// Check that an account string can be embedded in a comma-joined encoding.
///
/// Accounts must be non-empty and free of commas and control characters.
pub fn validate_account(account: &str) -> Result<()> {
    if account.is_empty() {
        return Err(EscrowError::InvalidAccount("empty account".to_string()));
    }
    if account.chars().any(|c| c == ',' || c.is_control()) {
        return Err(EscrowError::InvalidAccount(account.to_string()));
    }
    Ok(())
}

/// Side the sibling occupies relative to the running hash.
///
/// `Left` folds as `combine(sibling, running)`, `Right` as
/// `combine(running, sibling)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofPosition {
    Left,
    Right,
}

/// One sibling on the path from a leaf to the root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofStep {
    pub position: ProofPosition,
    pub hash: HexHash,
}

impl ProofStep {
    pub fn left(hash: impl Into<HexHash>) -> Self {
        Self {
            position: ProofPosition::Left,
            hash: hash.into(),
        }
    }

    pub fn right(hash: impl Into<HexHash>) -> Self {
        Self {
            position: ProofPosition::Right,
            hash: hash.into(),
        }
    }
}

/// Inclusion proof, ordered from the leaf-level sibling to the root-level sibling
pub type Proof = Vec<ProofStep>;
