//! KolEscrow Finalization
//!
//! Binds an epoch's aggregate parameters into a single domain hash and has
//! the attester sign it. The contract address is injected once through
//! [`Finalizer::new`] and used verbatim in every domain hash, so it must
//! match the deployed escrow contract exactly.

mod api;
mod domain;
mod root;
mod signer;

pub use api::{DomainHashResponse, FinalizeRequest, SignRequest, SignResponse};
pub use domain::{domain_hash, FinalizationParams, DOMAIN_TAG};
pub use root::normalize_root;
pub use signer::{FinalizedEpoch, Finalizer};
