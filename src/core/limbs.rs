//! Circuit Limb Encoding
//!
//! RSA moduli and signatures are far wider than a field element, so the
//! circuit takes them as `LIMB_COUNT` little-endian limbs of `LIMB_BITS`.

/// Bits per limb.
pub const LIMB_BITS: usize = 121;

/// Number of limbs (17 * 121 = 2057 bits, enough for RSA-2048).
pub const LIMB_COUNT: usize = 17;

/// Integer does not fit in `LIMB_COUNT * LIMB_BITS` bits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("integer of {bits} bits exceeds {max} bit limb capacity")]
pub struct IntegerTooWide {
    /// Significant bits in the input.
    pub bits: usize,
    /// Capacity of the limb encoding.
    pub max: usize,
}

/// Split a big-endian unsigned integer into circuit limbs (least significant first).
pub fn to_limbs(be_bytes: &[u8]) -> Result<[u128; LIMB_COUNT], IntegerTooWide> {
    let max = LIMB_BITS * LIMB_COUNT;
    let bits = significant_bits(be_bytes);
    if bits > max {
        return Err(IntegerTooWide { bits, max });
    }

    let mut limbs = [0u128; LIMB_COUNT];
    // Bit i of the integer, counted from the least significant end
    for (byte_index, &byte) in be_bytes.iter().rev().enumerate() {
        for bit in 0..8 {
            if byte >> bit & 1 == 1 {
                let position = byte_index * 8 + bit;
                limbs[position / LIMB_BITS] |= 1u128 << (position % LIMB_BITS);
            }
        }
    }
    Ok(limbs)
}

/// Reassemble limbs into a minimal big-endian byte string.
pub fn from_limbs(limbs: &[u128; LIMB_COUNT]) -> Vec<u8> {
    let total_bytes = (LIMB_BITS * LIMB_COUNT).div_ceil(8);
    let mut le = vec![0u8; total_bytes];

    for (limb_index, &limb) in limbs.iter().enumerate() {
        for bit in 0..LIMB_BITS {
            if limb >> bit & 1 == 1 {
                let position = limb_index * LIMB_BITS + bit;
                le[position / 8] |= 1 << (position % 8);
            }
        }
    }

    while le.last() == Some(&0) {
        le.pop();
    }
    le.reverse();
    le
}

fn significant_bits(be_bytes: &[u8]) -> usize {
    match be_bytes.iter().position(|&b| b != 0) {
        Some(first) => (be_bytes.len() - first - 1) * 8 + (8 - be_bytes[first].leading_zeros() as usize),
        None => 0,
    }
}
