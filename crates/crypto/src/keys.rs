use std::fmt;

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use kolescrow_core::EscrowError;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::hash::{keccak256, strip_hex_prefix};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Private key is not valid hex")]
    InvalidHex,
    #[error("Invalid private key length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Private key is not a valid secp256k1 scalar")]
    InvalidScalar,
    #[error("Invalid message hash: {0}")]
    InvalidMessageHash(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Signing failed: {0}")]
    SigningFailed(String),
    #[error("Signature recovery failed")]
    RecoveryFailed,
}

impl From<KeyError> for EscrowError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidHex | KeyError::InvalidLength(_) | KeyError::InvalidScalar => {
                EscrowError::InvalidPrivateKey(err.to_string())
            }
            KeyError::InvalidMessageHash(msg) => EscrowError::InvalidMessageHash(msg),
            KeyError::InvalidSignature(_)
            | KeyError::SigningFailed(_)
            | KeyError::RecoveryFailed => EscrowError::SigningFailed(err.to_string()),
        }
    }
}

/// 20-byte Ethereum-style account address
pub type Address = [u8; 20];

/// secp256k1 keypair of the attester that approves epoch finalization
#[derive(Clone)]
pub struct AttesterKeypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl AttesterKeypair {
    /// Generate a new random attester keypair
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Parse a private key given as hex, with or without a `0x` prefix.
    pub fn from_hex(private_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(strip_hex_prefix(private_key.trim()))
            .map_err(|_| KeyError::InvalidHex)?;
        if bytes.len() != 32 {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let signing_key = SigningKey::from_slice(&bytes).map_err(|_| KeyError::InvalidScalar)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Create from raw secret key bytes
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidScalar)?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = *signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Get the secret key as bytes
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// Ethereum address of this key
    pub fn address(&self) -> Address {
        address_from_verifying_key(&self.verifying_key)
    }

    /// Ethereum address as `0x`-prefixed lowercase hex
    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.address()))
    }
}

impl fmt::Debug for AttesterKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttesterKeypair")
            .field("address", &self.address_hex())
            .finish_non_exhaustive()
    }
}

/// Derive the Ethereum address: last 20 bytes of keccak256 over the
/// uncompressed public key without its 0x04 tag.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    address
}
