//! Node combiner trait for pluggable internal-node hashing.
//!
//! The SHA-256 combiner is a stand-in. The escrow contract verifies
//! against a curve-native commitment, and that binding is not settled yet;
//! swapping it in only needs a new `NodeCombiner`.

use kolescrow_core::HexHash;
use kolescrow_crypto::{is_sha256_hex, sha256_hex};

/// Pluggable binary combination of two tree nodes.
///
/// Tree building and proof verification must use the same combiner, or
/// every proof fails against the root.
pub trait NodeCombiner: Send + Sync {
    /// Parent of `left` and `right`, in that operand order
    fn combine(&self, left: &str, right: &str) -> HexHash;

    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Whether `value` is a well-formed node of this combiner's output
    fn is_node(&self, value: &str) -> bool {
        is_sha256_hex(value)
    }
}

/// `sha256_hex(left ++ right)` over the hex text of both children
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Combiner;

impl Sha256Combiner {
    pub fn new() -> Self {
        Self
    }
}

impl NodeCombiner for Sha256Combiner {
    fn combine(&self, left: &str, right: &str) -> HexHash {
        let mut joined = String::with_capacity(left.len() + right.len());
        joined.push_str(left);
        joined.push_str(right);
        sha256_hex(joined.as_bytes())
    }

    fn name(&self) -> &'static str {
        "sha256-placeholder"
    }
}
