//! Packed Byte Encoding
//!
//! The circuit reveals extracted text as field elements holding
//! `PACK_SIZE` ASCII bytes each, first byte in the lowest position.
//! Unused positions (and masked-out bytes) are zero.

use alloy_primitives::U256;

/// Bytes carried by one packed field element.
pub const PACK_SIZE: usize = 7;

/// Errors while unpacking a revealed span.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// Element has bits set above the packed width.
    #[error("element {index} exceeds 7 packed bytes")]
    Overflow {
        /// Position of the element inside the span.
        index: usize,
    },
    /// Decoded bytes are not printable ASCII.
    #[error("span contains non-ASCII byte 0x{0:02x}")]
    NonAscii(u8),
    /// Decoded text is not a decimal number.
    #[error("invalid decimal \"{0}\"")]
    InvalidNumber(String),
}

/// Pack bytes into field elements, `PACK_SIZE` bytes each.
///
/// The output always has exactly `slots` elements; extra bytes beyond
/// `slots * PACK_SIZE` are not representable and are reported as `None`.
pub fn pack_bytes(bytes: &[u8], slots: usize) -> Option<Vec<U256>> {
    if bytes.len() > slots * PACK_SIZE {
        return None;
    }

    let mut packed = vec![U256::ZERO; slots];
    for (slot, chunk) in packed.iter_mut().zip(bytes.chunks(PACK_SIZE)) {
        *slot = U256::from_le_slice(chunk);
    }
    Some(packed)
}

/// Unpack a span of field elements back into its non-zero bytes.
pub fn unpack_bytes(elements: &[U256]) -> Result<Vec<u8>, PackError> {
    let mut bytes = Vec::with_capacity(elements.len() * PACK_SIZE);

    for (index, element) in elements.iter().enumerate() {
        let le = element.to_le_bytes::<32>();
        if le[PACK_SIZE..].iter().any(|&b| b != 0) {
            return Err(PackError::Overflow { index });
        }
        bytes.extend(le[..PACK_SIZE].iter().copied().filter(|&b| b != 0));
    }

    Ok(bytes)
}

/// Unpack a span into an ASCII string, trimming zero padding.
pub fn unpack_string(elements: &[U256]) -> Result<String, PackError> {
    let bytes = unpack_bytes(elements)?;
    if let Some(&bad) = bytes.iter().find(|b| !b.is_ascii() || b.is_ascii_control()) {
        return Err(PackError::NonAscii(bad));
    }
    // ASCII checked above
    Ok(bytes.into_iter().map(char::from).collect())
}

/// Unpack a span holding decimal digits into a number.
pub fn unpack_number(elements: &[U256]) -> Result<u64, PackError> {
    let text = unpack_string(elements)?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PackError::InvalidNumber(text));
    }
    text.parse::<u64>().map_err(|_| PackError::InvalidNumber(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout_is_little_endian() {
        let packed = pack_bytes(b"notifications@github.com", 4).unwrap();
        // "notific" -> 0x63696669746f6e
        assert_eq!(packed[0], U256::from(0x0063_6966_6974_6f6eu64));
        assert_eq!(packed[3], U256::from(0x006d_6f63u64));
    }

    #[test]
    fn test_pack_rejects_oversized_text() {
        assert!(pack_bytes(&[b'a'; 15], 2).is_none());
        assert_eq!(pack_bytes(&[b'a'; 14], 2).unwrap().len(), 2);
    }

    #[test]
    fn test_unpack_trims_zero_padding() {
        let packed = pack_bytes(b"jstinhw/zk-grant-testing", 10).unwrap();
        assert_eq!(unpack_string(&packed).unwrap(), "jstinhw/zk-grant-testing");
    }

    #[test]
    fn test_unpack_number() {
        assert_eq!(unpack_number(&[U256::from(0x3531u64)]).unwrap(), 15);
        assert_eq!(unpack_number(&[U256::from(0x3631u64)]).unwrap(), 16);
    }

    #[test]
    fn test_unpack_number_rejects_text() {
        let packed = pack_bytes(b"1a", 1).unwrap();
        assert!(matches!(unpack_number(&packed), Err(PackError::InvalidNumber(_))));
        assert!(matches!(unpack_number(&[U256::ZERO]), Err(PackError::InvalidNumber(_))));
    }

    #[test]
    fn test_unpack_rejects_overflow() {
        let wide = U256::from(1u64) << 56usize;
        assert_eq!(unpack_bytes(&[U256::ZERO, wide]), Err(PackError::Overflow { index: 1 }));
    }

    #[test]
    fn test_unpack_rejects_control_bytes() {
        let packed = pack_bytes(b"a\r\n", 1).unwrap();
        assert_eq!(unpack_string(&packed), Err(PackError::NonAscii(b'\r')));
    }
}
