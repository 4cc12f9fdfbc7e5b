//! KolEscrow Merkle
//!
//! Binary Merkle tree committing a pool's reward distribution for one epoch.
//!
//! Records are put in canonical order, each one is encoded into a leaf
//! bound to (pool, epoch, position), and the leaves are folded into a root
//! the escrow contract stores on-chain. Claimants prove membership with a
//! sibling path. The node combination function is pluggable through
//! [`NodeCombiner`] so the contract's native hash can replace the SHA-256
//! placeholder without touching tree or proof logic.

pub mod api;
pub mod combiner;
pub mod distribution;
pub mod leaf;
pub mod ordering;
pub mod proof;
pub mod tree;

pub use api::{
    BuildTreeRequest, BuildTreeResponse, GenerateProofRequest, GenerateProofResponse,
    VerifyRequest, VerifyResponse, WireProofStep,
};
pub use combiner::{NodeCombiner, Sha256Combiner};
pub use distribution::{AccountProof, Distribution, Distributor};
pub use leaf::{leaf_hash, secure_hash, LeafEncoding, SecureHashInput, LEAF_TAG};
pub use ordering::CanonicalSet;
pub use proof::{path_fits_index, verify_proof, LeafClaim};
pub use tree::MerkleTree;
