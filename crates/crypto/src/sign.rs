use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::hash::{keccak256, strip_hex_prefix};
use crate::keys::{address_from_verifying_key, Address, AttesterKeypair, KeyError};

/// Prefix of an Ethereum personal message (EIP-191 version 0x45)
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// secp256k1 ECDSA signature with its Ethereum recovery byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 27 or 28
    pub v: u8,
}

impl EcdsaSignature {
    /// `r` as `0x`-prefixed hex without leading zeros
    pub fn r_hex(&self) -> String {
        minimal_hex(&self.r)
    }

    /// `s` as `0x`-prefixed hex without leading zeros
    pub fn s_hex(&self) -> String {
        minimal_hex(&self.s)
    }

    /// Rebuild a signature from hex components as produced by [`r_hex`](Self::r_hex).
    pub fn from_hex_parts(r: &str, s: &str, v: u8) -> Result<Self, KeyError> {
        Ok(Self {
            r: parse_scalar_hex(r)?,
            s: parse_scalar_hex(s)?,
            v,
        })
    }

    fn to_k256(self) -> Result<(Signature, RecoveryId), KeyError> {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        let sig = Signature::from_slice(&bytes)
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))?;
        let rec_id = match self.v {
            27 | 28 => RecoveryId::from_byte(self.v - 27),
            _ => None,
        }
        .ok_or_else(|| KeyError::InvalidSignature(format!("bad v: {}", self.v)))?;
        Ok((sig, rec_id))
    }
}

/// Digest signed for a personal message:
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
pub fn personal_message_digest(message: &[u8]) -> [u8; 32] {
    let mut data = format!("{}{}", PERSONAL_MESSAGE_PREFIX, message.len()).into_bytes();
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Decode a message hash given as hex, with or without `0x`.
pub fn parse_message_hash(message_hash: &str) -> Result<Vec<u8>, KeyError> {
    let stripped = strip_hex_prefix(message_hash.trim());
    if stripped.is_empty() {
        return Err(KeyError::InvalidMessageHash("empty".to_string()));
    }
    hex::decode(stripped).map_err(|e| KeyError::InvalidMessageHash(e.to_string()))
}

/// Sign raw message bytes as an Ethereum personal message.
///
/// Nonces are RFC 6979 deterministic and `s` is normalized to the lower
/// half of the curve order, so equal inputs always give equal signatures.
pub fn sign_message(keypair: &AttesterKeypair, message: &[u8]) -> Result<EcdsaSignature, KeyError> {
    let digest = personal_message_digest(message);
    let sig: Signature = keypair
        .signing_key()
        .sign_prehash(&digest)
        .map_err(|e| KeyError::SigningFailed(e.to_string()))?;
    let sig = sig.normalize_s().unwrap_or(sig);

    let v = recovery_byte(&digest, &sig, keypair.verifying_key())?;

    let bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    Ok(EcdsaSignature { r, s, v })
}

/// Sign a hex message hash (the bytes the hex decodes to form the message).
pub fn sign_message_hash(
    keypair: &AttesterKeypair,
    message_hash: &str,
) -> Result<EcdsaSignature, KeyError> {
    let message = parse_message_hash(message_hash)?;
    sign_message(keypair, &message)
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_signer(message: &[u8], signature: &EcdsaSignature) -> Result<Address, KeyError> {
    let digest = personal_message_digest(message);
    let (sig, rec_id) = signature.to_k256()?;
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, rec_id)
        .map_err(|_| KeyError::RecoveryFailed)?;
    Ok(address_from_verifying_key(&key))
}

/// Check that `signature` over `message` was produced by `address`.
pub fn verify_message_signature(
    address: &Address,
    message: &[u8],
    signature: &EcdsaSignature,
) -> bool {
    match recover_signer(message, signature) {
        Ok(recovered) => &recovered == address,
        Err(_) => false,
    }
}

/// Determine v by trying both recovery ids against the expected key.
fn recovery_byte(digest: &[u8; 32], sig: &Signature, expected: &VerifyingKey) -> Result<u8, KeyError> {
    for id in 0u8..=1 {
        let Some(rec_id) = RecoveryId::from_byte(id) else {
            continue;
        };
        if let Ok(key) = VerifyingKey::recover_from_prehash(digest, sig, rec_id) {
            if &key == expected {
                return Ok(27 + id);
            }
        }
    }
    Err(KeyError::RecoveryFailed)
}

/// Render big-endian bytes as `0x`-prefixed hex without leading zeros.
pub fn minimal_hex(bytes: &[u8]) -> String {
    let full = hex::encode(bytes);
    let trimmed = full.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed)
    }
}

fn parse_scalar_hex(value: &str) -> Result<[u8; 32], KeyError> {
    let digits = strip_hex_prefix(value.trim());
    if digits.is_empty() || digits.len() > 64 {
        return Err(KeyError::InvalidSignature(value.to_string()));
    }
    let padded = format!("{:0>64}", digits);
    let bytes = hex::decode(padded).map_err(|_| KeyError::InvalidSignature(value.to_string()))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keypair() -> AttesterKeypair {
        AttesterKeypair::from_hex(
            "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
        )
        .unwrap()
    }

    #[test]
    fn test_sign_and_recover() {
        let keypair = test_keypair();
        let message = b"Hello, KolEscrow!";

        let signature = sign_message(&keypair, message).unwrap();
        assert_eq!(recover_signer(message, &signature).unwrap(), keypair.address());
        assert!(verify_message_signature(&keypair.address(), message, &signature));

        // Wrong data should fail
        assert!(!verify_message_signature(&keypair.address(), b"Wrong data", &signature));
    }

    #[test]
    fn test_wrong_signer_fails() {
        let keypair1 = test_keypair();
        let keypair2 = AttesterKeypair::generate();
        let message = b"Test data";

        let signature = sign_message(&keypair1, message).unwrap();
        assert!(!verify_message_signature(&keypair2.address(), message, &signature));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let keypair = test_keypair();
        let a = sign_message_hash(&keypair, "0xdeadbeef").unwrap();
        let b = sign_message_hash(&keypair, "deadbeef").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_low_s() {
        // secp256k1 order / 2, big-endian
        const HALF_ORDER: [u8; 32] = [
            0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46,
            0x68, 0x1B, 0x20, 0xA0,
        ];
        let keypair = test_keypair();
        for i in 0u8..16 {
            let sig = sign_message(&keypair, &[i; 32]).unwrap();
            assert!(sig.s <= HALF_ORDER);
            assert!(sig.v == 27 || sig.v == 28);
        }
    }

    #[test]
    fn test_hex_parts_roundtrip() {
        let keypair = test_keypair();
        let sig = sign_message(&keypair, b"payload").unwrap();
        let rebuilt = EcdsaSignature::from_hex_parts(&sig.r_hex(), &sig.s_hex(), sig.v).unwrap();
        assert_eq!(rebuilt, sig);
    }

    #[test]
    fn test_minimal_hex() {
        assert_eq!(minimal_hex(&[0, 0, 0x0a, 0xbc]), "0xabc");
        assert_eq!(minimal_hex(&[0; 4]), "0x0");
        assert_eq!(minimal_hex(&[0x10]), "0x10");
    }

    #[test]
    fn test_message_hash_must_be_hex() {
        let keypair = test_keypair();
        assert!(matches!(
            sign_message_hash(&keypair, "0xnothex"),
            Err(KeyError::InvalidMessageHash(_))
        ));
        assert!(matches!(
            sign_message_hash(&keypair, ""),
            Err(KeyError::InvalidMessageHash(_))
        ));
    }

    #[test]
    fn test_personal_digest_prefix_uses_length() {
        assert_ne!(personal_message_digest(&[1u8; 32]), personal_message_digest(&[1u8; 31]));
    }

    #[test]
    fn test_bad_v_rejected() {
        let keypair = test_keypair();
        let mut sig = sign_message(&keypair, b"x").unwrap();
        sig.v = 5;
        assert!(recover_signer(b"x", &sig).is_err());
    }
}
