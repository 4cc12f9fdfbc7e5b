//! Request/response shapes for the merkle call contracts.
//!
//! These are plain data exchanged with the HTTP-layer collaborator. The
//! verify request carries proof steps loosely typed, so a malformed step
//! yields `valid: false` instead of a rejected request.

use kolescrow_core::{
    DistributionRecord, Epoch, EscrowError, HexHash, PoolId, Proof, ProofPosition, ProofStep,
    Result,
};
use serde::{Deserialize, Serialize};

use crate::distribution::Distributor;
use crate::proof::LeafClaim;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTreeRequest {
    pub pool_id: PoolId,
    pub epoch: Epoch,
    pub distribution_data: Vec<DistributionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTreeResponse {
    pub merkle_root: HexHash,
    pub leaf_hashes: Vec<HexHash>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateProofRequest {
    pub pool_id: PoolId,
    pub epoch: Epoch,
    pub distribution_data: Vec<DistributionRecord>,
    pub account: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateProofResponse {
    pub proof: Proof,
    pub index: u64,
    pub leaf: HexHash,
    pub merkle_root: HexHash,
}

/// Proof step as received from a claimant, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireProofStep {
    pub position: String,
    pub hash: String,
}

impl WireProofStep {
    /// `None` when the position tag is neither `left` nor `right`
    pub fn to_step(&self) -> Option<ProofStep> {
        let position = match self.position.as_str() {
            "left" => ProofPosition::Left,
            "right" => ProofPosition::Right,
            _ => return None,
        };
        Some(ProofStep {
            position,
            hash: self.hash.clone(),
        })
    }
}

impl From<ProofStep> for WireProofStep {
    fn from(step: ProofStep) -> Self {
        let position = match step.position {
            ProofPosition::Left => "left",
            ProofPosition::Right => "right",
        };
        Self {
            position: position.to_string(),
            hash: step.hash,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub account: String,
    pub amount: u128,
    pub shares: u128,
    pub proof: Vec<WireProofStep>,
    pub merkle_root: String,
    pub pool_id: PoolId,
    pub epoch: Epoch,
    /// Signed so a negative index reaches validation instead of failing to parse
    pub index: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

impl Distributor {
    /// `build_tree`: root and padded leaf hashes for a record set
    pub fn build_tree(&self, request: BuildTreeRequest) -> Result<BuildTreeResponse> {
        let dist = self.build(request.distribution_data, request.pool_id, request.epoch)?;
        Ok(BuildTreeResponse {
            merkle_root: dist.root().to_string(),
            leaf_hashes: dist.leaves().to_vec(),
        })
    }

    /// `generate_proof`: proof, canonical index and leaf for one account
    pub fn generate_proof(&self, request: GenerateProofRequest) -> Result<GenerateProofResponse> {
        let dist = self.build(request.distribution_data, request.pool_id, request.epoch)?;
        let account_proof = dist.proof_for_account(&request.account)?;
        Ok(GenerateProofResponse {
            proof: account_proof.proof,
            index: account_proof.index,
            leaf: account_proof.leaf,
            merkle_root: dist.root().to_string(),
        })
    }

    /// `verify`: only a negative index is an error; every other mismatch
    /// is `valid: false`.
    pub fn verify_request(&self, request: &VerifyRequest) -> Result<VerifyResponse> {
        let index =
            u64::try_from(request.index).map_err(|_| EscrowError::InvalidIndex(request.index))?;

        let Some(proof) = request
            .proof
            .iter()
            .map(WireProofStep::to_step)
            .collect::<Option<Vec<ProofStep>>>()
        else {
            return Ok(VerifyResponse { valid: false });
        };

        let claim = LeafClaim {
            account: request.account.clone(),
            shares: request.shares,
            amount: request.amount,
            index,
            pool_id: request.pool_id,
            epoch: request.epoch,
        };
        Ok(VerifyResponse {
            valid: self.verify(&claim, &proof, &request.merkle_root),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BuildTreeRequest {
        serde_json::from_str(
            r#"{
                "pool_id": 1,
                "epoch": 0,
                "distribution_data": [
                    {"account": "b", "shares": 1, "amount": 10},
                    {"account": "a", "shares": 2, "amount": 20}
                ]
            }"#,
        )
        .unwrap()
    }

    fn verify_for(distributor: &Distributor, account: &str) -> VerifyRequest {
        let build = request();
        let proof = distributor
            .generate_proof(GenerateProofRequest {
                pool_id: build.pool_id,
                epoch: build.epoch,
                distribution_data: build.distribution_data.clone(),
                account: account.to_string(),
            })
            .unwrap();
        let record = build
            .distribution_data
            .iter()
            .find(|r| r.account == account)
            .unwrap();
        VerifyRequest {
            account: account.to_string(),
            amount: record.amount,
            shares: record.shares,
            proof: proof.proof.into_iter().map(WireProofStep::from).collect(),
            merkle_root: proof.merkle_root,
            pool_id: build.pool_id,
            epoch: build.epoch,
            index: proof.index as i64,
        }
    }

    #[test]
    fn test_build_tree_response_shape() {
        let response = Distributor::default().build_tree(request()).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["merkle_root"].is_string());
        assert_eq!(json["leaf_hashes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_generate_then_verify() {
        let distributor = Distributor::default();
        for account in ["a", "b"] {
            let req = verify_for(&distributor, account);
            assert!(distributor.verify_request(&req).unwrap().valid);
        }
    }

    #[test]
    fn test_generate_proof_unknown_account() {
        let build = request();
        let err = Distributor::default()
            .generate_proof(GenerateProofRequest {
                pool_id: 1,
                epoch: 0,
                distribution_data: build.distribution_data,
                account: "c".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.kind(), kolescrow_core::ErrorKind::NotFound);
    }

    #[test]
    fn test_negative_index_is_error() {
        let distributor = Distributor::default();
        let mut req = verify_for(&distributor, "a");
        req.index = -1;
        assert_eq!(
            distributor.verify_request(&req).unwrap_err(),
            EscrowError::InvalidIndex(-1)
        );
    }

    #[test]
    fn test_unknown_position_is_invalid() {
        let distributor = Distributor::default();
        let mut req = verify_for(&distributor, "a");
        req.proof[0].position = "up".to_string();
        assert!(!distributor.verify_request(&req).unwrap().valid);
    }

    #[test]
    fn test_wrong_index_is_invalid() {
        let distributor = Distributor::default();
        let mut req = verify_for(&distributor, "a");
        req.index = 1;
        assert!(!distributor.verify_request(&req).unwrap().valid);
        req.index = 2;
        assert!(!distributor.verify_request(&req).unwrap().valid);
    }

    #[test]
    fn test_proof_json_carries_tags() {
        let response = Distributor::default()
            .generate_proof(GenerateProofRequest {
                pool_id: 1,
                epoch: 0,
                distribution_data: request().distribution_data,
                account: "b".to_string(),
            })
            .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["index"], 1);
        assert_eq!(json["proof"][0]["position"], "left");
    }
}
