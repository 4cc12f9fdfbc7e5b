//! KolEscrow Cryptography
//!
//! Hash helpers and the secp256k1 attester key used to approve epoch
//! finalization.

mod hash;
mod keys;
mod sign;

pub use hash::*;
pub use keys::*;
pub use sign::*;
