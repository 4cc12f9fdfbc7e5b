//! Two-stage leaf encoding.
//!
//! Stage one ("secure hash") binds the record to its pool, epoch and
//! canonical position:
//!
//! ```text
//! secure = sha256_hex("LEAF_TAG,<pool_id>,<epoch>,<index>,<account>,<shares>,<amount>")
//! leaf   = sha256_hex("<account>,<secure>")
//! ```
//!
//! Each stage can be truncated to its first N comma-joined elements. The
//! on-chain verifier receives the secure hash separately from the account,
//! so both stages must stay bit-exact.

use kolescrow_core::{DistributionRecord, Epoch, HexHash, PoolId};
use kolescrow_crypto::sha256_hex;
use serde::{Deserialize, Serialize};

/// Domain tag leading every secure hash
pub const LEAF_TAG: &str = "LEAF_TAG";

/// Number of elements in the secure hash tuple
pub const SECURE_HASH_FIELDS: usize = 7;

/// Number of elements in the leaf hash tuple
pub const LEAF_HASH_FIELDS: usize = 2;

/// Fields of the stage-one tuple, in encoding order
#[derive(Debug, Clone, Copy)]
pub struct SecureHashInput<'a> {
    pub leaf_tag: &'a str,
    pub pool_id: PoolId,
    pub epoch: Epoch,
    pub index: u64,
    pub account: &'a str,
    pub shares: u128,
    pub amount: u128,
}

impl<'a> SecureHashInput<'a> {
    /// Tuple for `record` at canonical `index`, tagged with [`LEAF_TAG`]
    pub fn for_record(pool_id: PoolId, epoch: Epoch, index: u64, record: &'a DistributionRecord) -> Self {
        Self {
            leaf_tag: LEAF_TAG,
            pool_id,
            epoch,
            index,
            account: &record.account,
            shares: record.shares,
            amount: record.amount,
        }
    }
}

/// Stage one: SHA-256 over the first `count` comma-joined tuple elements
pub fn secure_hash(input: &SecureHashInput<'_>, count: usize) -> HexHash {
    let elements = [
        input.leaf_tag.to_string(),
        input.pool_id.to_string(),
        input.epoch.to_string(),
        input.index.to_string(),
        input.account.to_string(),
        input.shares.to_string(),
        input.amount.to_string(),
    ];
    hash_joined(&elements, count)
}

/// Stage two: SHA-256 over the first `count` of `(account, secure_hash)`
pub fn leaf_hash(account: &str, secure_hash: &str, count: usize) -> HexHash {
    hash_joined(&[account, secure_hash], count)
}

fn hash_joined<S: AsRef<str>>(elements: &[S], count: usize) -> HexHash {
    let joined = elements
        .iter()
        .take(count)
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(",");
    sha256_hex(joined.as_bytes())
}

/// Truncation counts for the two encoding stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafEncoding {
    pub secure_hash_fields: usize,
    pub leaf_hash_fields: usize,
}

impl Default for LeafEncoding {
    fn default() -> Self {
        Self {
            secure_hash_fields: SECURE_HASH_FIELDS,
            leaf_hash_fields: LEAF_HASH_FIELDS,
        }
    }
}

impl LeafEncoding {
    /// Leaf hash for `record` at canonical `position`.
    ///
    /// `position` must be the record's index in the canonical set.
    pub fn encode(
        &self,
        pool_id: PoolId,
        epoch: Epoch,
        position: u64,
        record: &DistributionRecord,
    ) -> HexHash {
        self.encode_parts(pool_id, epoch, position, &record.account, record.shares, record.amount)
    }

    /// Same as [`encode`](Self::encode) from loose fields, as a verifier receives them
    pub fn encode_parts(
        &self,
        pool_id: PoolId,
        epoch: Epoch,
        position: u64,
        account: &str,
        shares: u128,
        amount: u128,
    ) -> HexHash {
        let input = SecureHashInput {
            leaf_tag: LEAF_TAG,
            pool_id,
            epoch,
            index: position,
            account,
            shares,
            amount,
        };
        let secure = secure_hash(&input, self.secure_hash_fields);
        leaf_hash(account, &secure, self.leaf_hash_fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_hash_encoding() {
        let record = DistributionRecord::new("a", 2, 20);
        let input = SecureHashInput::for_record(1, 0, 0, &record);
        assert_eq!(
            secure_hash(&input, SECURE_HASH_FIELDS),
            sha256_hex(b"LEAF_TAG,1,0,0,a,2,20")
        );
    }

    #[test]
    fn test_leaf_hash_encoding() {
        let secure = sha256_hex(b"LEAF_TAG,1,0,0,a,2,20");
        let expected = sha256_hex(format!("a,{}", secure).as_bytes());
        assert_eq!(leaf_hash("a", &secure, LEAF_HASH_FIELDS), expected);
    }

    #[test]
    fn test_truncation() {
        let record = DistributionRecord::new("acct", 5, 50);
        let input = SecureHashInput::for_record(9, 3, 2, &record);
        assert_eq!(secure_hash(&input, 3), sha256_hex(b"LEAF_TAG,9,3"));
        assert_eq!(secure_hash(&input, 0), sha256_hex(b""));
        // Counts past the tuple length use every element
        assert_eq!(secure_hash(&input, 12), secure_hash(&input, 7));
        assert_eq!(leaf_hash("acct", "ff", 1), sha256_hex(b"acct"));
    }

    #[test]
    fn test_encode_matches_stages() {
        let record = DistributionRecord::new("0x04ab", 7, 7_000_000_000_000_000_000);
        let encoding = LeafEncoding::default();
        let secure = secure_hash(&SecureHashInput::for_record(4, 2, 1, &record), 7);
        assert_eq!(encoding.encode(4, 2, 1, &record), leaf_hash("0x04ab", &secure, 2));
    }

    #[test]
    fn test_position_changes_leaf() {
        let record = DistributionRecord::new("a", 1, 1);
        let encoding = LeafEncoding::default();
        assert_ne!(encoding.encode(1, 0, 0, &record), encoding.encode(1, 0, 1, &record));
        assert_ne!(encoding.encode(1, 0, 0, &record), encoding.encode(2, 0, 0, &record));
        assert_ne!(encoding.encode(1, 0, 0, &record), encoding.encode(1, 1, 0, &record));
    }
}
