use kolescrow_core::{Epoch, EscrowError, HexHash, PoolId, Result};
use kolescrow_crypto::sha256_hex;
use kolescrow_merkle::Distribution;
use serde::{Deserialize, Serialize};

use crate::root::normalize_root;

/// Leading tag of the finalization tuple
pub const DOMAIN_TAG: &str = "KOL_FINALIZE";

/// Epoch aggregates the attester approves for publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationParams {
    pub pool_id: PoolId,
    pub epoch: Epoch,
    /// Hex with `0x` prefix, or decimal
    pub merkle_root: String,
    pub total_shares: u128,
    /// Conversion factor between shares and payout units
    pub unit_k: u128,
    pub deadline_ts: u64,
    /// Replay guard
    pub nonce: u64,
}

impl FinalizationParams {
    /// Parameters for a built distribution. The root is passed `0x`-prefixed.
    pub fn for_distribution(
        dist: &Distribution,
        unit_k: u128,
        deadline_ts: u64,
        nonce: u64,
    ) -> Result<Self> {
        if dist.is_empty() {
            return Err(EscrowError::InvalidMerkleRoot(String::new()));
        }
        Ok(Self {
            pool_id: dist.pool_id,
            epoch: dist.epoch,
            merkle_root: format!("0x{}", dist.root()),
            total_shares: dist.total_shares,
            unit_k,
            deadline_ts,
            nonce,
        })
    }
}

/// SHA-256 over
/// `KOL_FINALIZE,<contract>,<pool_id>,<epoch>,<root as integer>,<total_shares>,<unit_k>,<deadline_ts>,<nonce>`.
///
/// The contract address is embedded exactly as given.
pub fn domain_hash(contract_address: &str, params: &FinalizationParams) -> Result<HexHash> {
    let root = normalize_root(&params.merkle_root)?;
    let message = [
        DOMAIN_TAG.to_string(),
        contract_address.to_string(),
        params.pool_id.to_string(),
        params.epoch.to_string(),
        root,
        params.total_shares.to_string(),
        params.unit_k.to_string(),
        params.deadline_ts.to_string(),
        params.nonce.to_string(),
    ]
    .join(",");
    Ok(sha256_hex(message.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x05a1b2c3";

    fn params() -> FinalizationParams {
        FinalizationParams {
            pool_id: 1,
            epoch: 2,
            merkle_root: "0x10".to_string(),
            total_shares: 300,
            unit_k: 1_000_000,
            deadline_ts: 1_700_000_000,
            nonce: 7,
        }
    }

    #[test]
    fn test_domain_hash_encoding() {
        let expected =
            sha256_hex(b"KOL_FINALIZE,0x05a1b2c3,1,2,16,300,1000000,1700000000,7");
        assert_eq!(domain_hash(CONTRACT, &params()).unwrap(), expected);
    }

    #[test]
    fn test_hex_and_decimal_root_agree() {
        let mut decimal = params();
        decimal.merkle_root = "16".to_string();
        assert_eq!(
            domain_hash(CONTRACT, &params()).unwrap(),
            domain_hash(CONTRACT, &decimal).unwrap()
        );
    }

    #[test]
    fn test_every_field_is_bound() {
        let base = domain_hash(CONTRACT, &params()).unwrap();
        let variants: Vec<Box<dyn Fn(&mut FinalizationParams)>> = vec![
            Box::new(|p| p.pool_id += 1),
            Box::new(|p| p.epoch += 1),
            Box::new(|p| p.merkle_root = "0x11".to_string()),
            Box::new(|p| p.total_shares += 1),
            Box::new(|p| p.unit_k += 1),
            Box::new(|p| p.deadline_ts += 1),
            Box::new(|p| p.nonce += 1),
        ];
        for mutate in variants {
            let mut p = params();
            mutate(&mut p);
            assert_ne!(domain_hash(CONTRACT, &p).unwrap(), base);
        }
        assert_ne!(domain_hash("0x05a1b2c4", &params()).unwrap(), base);
    }

    #[test]
    fn test_bad_root_rejected() {
        let mut p = params();
        p.merkle_root = "deadbeef".to_string();
        assert!(matches!(
            domain_hash(CONTRACT, &p),
            Err(EscrowError::InvalidMerkleRoot(_))
        ));
    }

    #[test]
    fn test_params_json() {
        let p: FinalizationParams = serde_json::from_str(
            r#"{"pool_id":1,"epoch":2,"merkle_root":"0x10","total_shares":300,
                "unit_k":1000000,"deadline_ts":1700000000,"nonce":7}"#,
        )
        .unwrap();
        assert_eq!(p, params());
    }
}
