//! Request/response shapes for the finalization call contracts.
//!
//! A request may carry its own private key. Otherwise the caller's
//! configured key is used; there is no built-in fallback key.

use kolescrow_core::{EscrowError, HexHash, Result};
use serde::{Deserialize, Serialize};

use crate::domain::FinalizationParams;
use crate::signer::{FinalizedEpoch, Finalizer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainHashResponse {
    pub domain_hash: HexHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
    pub message_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResponse {
    pub r: String,
    pub s: String,
    pub v: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub pool_id: u64,
    pub epoch: u64,
    pub merkle_root: String,
    pub total_shares: u128,
    pub unit_k: u128,
    pub deadline_ts: u64,
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl FinalizeRequest {
    pub fn params(&self) -> FinalizationParams {
        FinalizationParams {
            pool_id: self.pool_id,
            epoch: self.epoch,
            merkle_root: self.merkle_root.clone(),
            total_shares: self.total_shares,
            unit_k: self.unit_k,
            deadline_ts: self.deadline_ts,
            nonce: self.nonce,
        }
    }
}

fn pick_key<'a>(requested: Option<&'a str>, configured: Option<&'a str>) -> Result<&'a str> {
    requested
        .or(configured)
        .ok_or_else(|| EscrowError::InvalidPrivateKey("no private key supplied".to_string()))
}

impl Finalizer {
    pub fn domain_hash_request(&self, params: &FinalizationParams) -> Result<DomainHashResponse> {
        Ok(DomainHashResponse {
            domain_hash: self.domain_hash(params)?,
        })
    }

    pub fn sign_request(
        &self,
        request: &SignRequest,
        configured_key: Option<&str>,
    ) -> Result<SignResponse> {
        let key = pick_key(request.private_key.as_deref(), configured_key)?;
        let signature = self.sign_with_key_hex(&request.message_hash, key)?;
        Ok(SignResponse {
            r: signature.r_hex(),
            s: signature.s_hex(),
            v: signature.v,
        })
    }

    pub fn finalize_request(
        &self,
        request: &FinalizeRequest,
        configured_key: Option<&str>,
    ) -> Result<FinalizedEpoch> {
        let key = pick_key(request.private_key.as_deref(), configured_key)?;
        self.finalize_with_key_hex(&request.params(), key)
    }
}
