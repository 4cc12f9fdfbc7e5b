//! KolEscrow Core Types
//!
//! This crate defines the data structures and error taxonomy shared by the
//! distribution tree, the finalization signer and their callers.

mod error;
mod types;

pub use error::*;
pub use types::*;
