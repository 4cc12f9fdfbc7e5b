use kolescrow_core::{Epoch, EscrowError, HexHash, PoolId, Result};
use kolescrow_crypto::{
    parse_message_hash, recover_signer, sign_message, Address, AttesterKeypair, EcdsaSignature,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{domain_hash, FinalizationParams};

/// Signed finalization payload submitted to the chain-write collaborator.
///
/// Echoes the input parameters next to the domain hash and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedEpoch {
    pub pool_id: PoolId,
    pub epoch: Epoch,
    pub merkle_root: String,
    pub total_shares: u128,
    pub unit_k: u128,
    pub deadline_ts: u64,
    pub nonce: u64,
    pub msg_hash: HexHash,
    pub r: String,
    pub s: String,
    pub v: u8,
}

impl FinalizedEpoch {
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

    pub fn signature(&self) -> Result<EcdsaSignature> {
        Ok(EcdsaSignature::from_hex_parts(&self.r, &self.s, self.v)?)
    }
}

/// Finalization signer bound to one deployed escrow contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalizer {
    contract_address: String,
}

impl Finalizer {
    /// The address is embedded verbatim in every domain hash. It must be
    /// non-empty and must not break the comma-joined encoding.
    pub fn new(contract_address: impl Into<String>) -> Result<Self> {
        let contract_address = contract_address.into();
        if contract_address.is_empty()
            || contract_address
                .chars()
                .any(|c| c == ',' || c.is_control() || c.is_whitespace())
        {
            return Err(EscrowError::InvalidContractAddress(contract_address));
        }
        Ok(Self { contract_address })
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn domain_hash(&self, params: &FinalizationParams) -> Result<HexHash> {
        domain_hash(&self.contract_address, params)
    }

    /// Sign a hex message hash with the attester key.
    pub fn sign(&self, message_hash: &str, keypair: &AttesterKeypair) -> Result<EcdsaSignature> {
        let message = parse_message_hash(message_hash)?;
        Ok(sign_message(keypair, &message)?)
    }

    /// Sign with a hex private key. The key is checked before the message.
    pub fn sign_with_key_hex(&self, message_hash: &str, private_key: &str) -> Result<EcdsaSignature> {
        let keypair = AttesterKeypair::from_hex(private_key)?;
        self.sign(message_hash, &keypair)
    }

    /// Compute the domain hash for `params` and sign it.
    pub fn finalize(
        &self,
        params: &FinalizationParams,
        keypair: &AttesterKeypair,
    ) -> Result<FinalizedEpoch> {
        let msg_hash = self.domain_hash(params)?;
        let signature = self.sign(&msg_hash, keypair)?;

        info!(
            "Finalized pool {} epoch {} nonce {} (attester {})",
            params.pool_id,
            params.epoch,
            params.nonce,
            keypair.address_hex()
        );
        debug!("Domain hash {}", msg_hash);

        Ok(FinalizedEpoch {
            pool_id: params.pool_id,
            epoch: params.epoch,
            merkle_root: params.merkle_root.clone(),
            total_shares: params.total_shares,
            unit_k: params.unit_k,
            deadline_ts: params.deadline_ts,
            nonce: params.nonce,
            msg_hash,
            r: signature.r_hex(),
            s: signature.s_hex(),
            v: signature.v,
        })
    }

    /// Same as [`finalize`](Self::finalize), rejecting a malformed key before any hashing.
    pub fn finalize_with_key_hex(
        &self,
        params: &FinalizationParams,
        private_key: &str,
    ) -> Result<FinalizedEpoch> {
        let keypair = AttesterKeypair::from_hex(private_key)?;
        self.finalize(params, &keypair)
    }

    /// Address that signed `finalized`, after checking its domain hash
    /// matches the echoed parameters under this contract.
    pub fn recover_attester(&self, finalized: &FinalizedEpoch) -> Result<Address> {
        let expected = self.domain_hash(&finalized.params())?;
        if expected != finalized.msg_hash {
            return Err(EscrowError::InvalidMessageHash(finalized.msg_hash.clone()));
        }
        let message = parse_message_hash(&finalized.msg_hash)?;
        Ok(recover_signer(&message, &finalized.signature()?)?)
    }

    /// Whether `finalized` was signed by `attester` for this contract.
    pub fn verify_finalization(&self, finalized: &FinalizedEpoch, attester: &Address) -> bool {
        match self.recover_attester(finalized) {
            Ok(recovered) => &recovered == attester,
            Err(e) => {
                debug!("Finalization does not verify: {}", e);
                false
            }
        }
    }
}
