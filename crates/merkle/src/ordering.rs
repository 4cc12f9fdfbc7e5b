//! Canonical ordering of distribution records.
//!
//! The position of a record in this order is baked into its leaf hash,
//! so every implementation must sort identically: ascending by the raw
//! bytes of the account string.

use std::collections::HashSet;

use kolescrow_core::{validate_account, DistributionRecord, EscrowError, Result};
use tracing::warn;

/// Records sorted by account, with unique and well-formed accounts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalSet {
    records: Vec<DistributionRecord>,
}

impl CanonicalSet {
    /// Validate and sort a record set.
    ///
    /// Duplicate accounts are rejected rather than deduplicated.
    pub fn from_records(mut records: Vec<DistributionRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            validate_account(&record.account)?;
            if !seen.insert(record.account.as_str()) {
                warn!("Rejecting distribution with duplicate account {}", record.account);
                return Err(EscrowError::DuplicateAccount(record.account.clone()));
            }
        }

        // `str` ordering is byte-lexicographic over UTF-8, which matches
        // code point order
        records.sort_by(|a, b| a.account.as_bytes().cmp(b.account.as_bytes()));
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DistributionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&DistributionRecord> {
        self.records.get(position)
    }

    /// Canonical position of an account
    pub fn position_of(&self, account: &str) -> Option<usize> {
        self.records
            .binary_search_by(|r| r.account.as_bytes().cmp(account.as_bytes()))
            .ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistributionRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<DistributionRecord> {
        self.records
    }
}
