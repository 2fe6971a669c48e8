//! SHA-256 Message Padding
//!
//! Pads a message the way SHA-256 does (FIPS 180-4 §5.1.1) and then
//! zero-fills it to a fixed circuit capacity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::SHA256_BLOCK_LEN;

/// Bytes taken by the 64-bit message length suffix.
const LENGTH_SUFFIX_LEN: usize = 8;

/// SHA-padded length exceeds the buffer capacity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("padded length {padded_len} exceeds capacity {capacity}")]
pub struct CapacityExceeded {
    /// Length after SHA padding.
    pub padded_len: usize,
    /// Configured buffer size.
    pub capacity: usize,
}

/// A SHA-padded message zero-filled to a fixed capacity.
///
/// `data_len <= padded_len <= bytes.len()`; `padded_len` and `bytes.len()`
/// are multiples of 64.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddedBlock {
    bytes: Vec<u8>,
    data_len: usize,
    padded_len: usize,
}

impl PaddedBlock {
    /// Full buffer, including the zero fill.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the original message.
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Length of the SHA-padded message.
    pub fn padded_len(&self) -> usize {
        self.padded_len
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The SHA-padded message without zero fill.
    pub fn padded_message(&self) -> &[u8] {
        &self.bytes[..self.padded_len]
    }

    /// The original message bytes.
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.data_len]
    }
}

/// Length of `data_len` bytes after SHA-256 padding.
pub fn sha256_padded_len(data_len: usize) -> usize {
    // 0x80 marker + length suffix, rounded up to a whole block
    (data_len + 1 + LENGTH_SUFFIX_LEN).div_ceil(SHA256_BLOCK_LEN) * SHA256_BLOCK_LEN
}

/// SHA-pad `message` and zero-fill to `capacity` bytes.
///
/// `capacity` must be a multiple of 64.
pub fn sha256_pad(message: &[u8], capacity: usize) -> Result<PaddedBlock, CapacityExceeded> {
    debug_assert_eq!(capacity % SHA256_BLOCK_LEN, 0);

    let padded_len = sha256_padded_len(message.len());
    if padded_len > capacity {
        return Err(CapacityExceeded { padded_len, capacity });
    }

    let mut bytes = Vec::with_capacity(capacity);
    bytes.extend_from_slice(message);
    bytes.push(0x80);
    bytes.resize(padded_len - LENGTH_SUFFIX_LEN, 0);
    let bit_len = (message.len() as u64) * 8;
    bytes.extend_from_slice(&bit_len.to_be_bytes());
    bytes.resize(capacity, 0);

    Ok(PaddedBlock {
        bytes,
        data_len: message.len(),
        padded_len,
    })
}
