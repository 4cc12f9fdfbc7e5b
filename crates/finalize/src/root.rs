use kolescrow_core::{EscrowError, Result};

/// Base of one limb in the decimal accumulator
const LIMB_BASE: u64 = 1_000_000_000;

/// Render a merkle root as the decimal text of its integer value.
///
/// Text starting with `0x` or `0X` is read as hexadecimal of any length.
/// Anything else must be plain decimal digits. Leading zeros are dropped.
pub fn normalize_root(merkle_root: &str) -> Result<String> {
    let invalid = || EscrowError::InvalidMerkleRoot(merkle_root.to_string());

    if let Some(digits) = merkle_root
        .strip_prefix("0x")
        .or_else(|| merkle_root.strip_prefix("0X"))
    {
        return hex_to_decimal(digits).ok_or_else(invalid);
    }

    if merkle_root.is_empty() || !merkle_root.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let trimmed = merkle_root.trim_start_matches('0');
    Ok(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

fn hex_to_decimal(digits: &str) -> Option<String> {
    if digits.is_empty() {
        return None;
    }

    // Little-endian base 10^9 limbs
    let mut limbs: Vec<u64> = vec![0];
    for c in digits.chars() {
        let mut carry = u64::from(c.to_digit(16)?);
        for limb in limbs.iter_mut() {
            let value = *limb * 16 + carry;
            *limb = value % LIMB_BASE;
            carry = value / LIMB_BASE;
        }
        if carry > 0 {
            limbs.push(carry);
        }
    }

    let mut out = String::with_capacity(limbs.len() * 9);
    let mut iter = limbs.iter().rev();
    if let Some(head) = iter.next() {
        out.push_str(&head.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{:09}", limb));
    }
    Some(out)
}
