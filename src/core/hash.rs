//! Hashing Primitives
//!
//! Provides deterministic hashing for:
//! - SHA-256 partial (streaming) state, used to precompute the body prefix
//!   outside the circuit and to self-check header padding
//! - Ledger state hashing for snapshot verification

use alloy_primitives::{Address, U256};
use sha2::digest::consts::U64;
use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// SHA-256 block size in bytes.
pub const SHA256_BLOCK_LEN: usize = 64;

/// SHA-256 initial hash value (FIPS 180-4 §5.3.3).
pub const SHA256_IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
    0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Error returned when partial hashing is given a non block-aligned input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("partial SHA-256 input of {0} bytes is not a multiple of 64")]
pub struct UnalignedInput(pub usize);

/// Run the SHA-256 compression function over `data` without finalization.
///
/// `data` must already be block aligned. The result is the intermediate
/// state serialized big-endian, which is what the circuit resumes from.
/// When `data` is a correctly padded message, the state equals the digest.
pub fn partial_sha256(data: &[u8]) -> Result<StateHash, UnalignedInput> {
    if data.len() % SHA256_BLOCK_LEN != 0 {
        return Err(UnalignedInput(data.len()));
    }

    let mut state = SHA256_IV;
    let blocks: Vec<GenericArray<u8, U64>> = data
        .chunks_exact(SHA256_BLOCK_LEN)
        .map(GenericArray::clone_from_slice)
        .collect();
    sha2::compress256(&mut state, &blocks);

    Ok(state_to_bytes(&state))
}

/// Serialize a SHA-256 state as 32 big-endian bytes.
fn state_to_bytes(state: &[u32; 8]) -> StateHash {
    let mut out = [0u8; 32];
    for (i, word) in state.iter().enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// Compute a plain SHA-256 of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> StateHash {
    Sha256::digest(data).into()
}

/// Deterministic hasher for ledger state.
///
/// Wraps SHA-256 with helpers for ledger field types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for ledger snapshots.
    pub fn for_ledger_state() -> Self {
        Self::new(b"ZK_BOUNTY_LEDGER_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a 256-bit integer (big-endian).
    #[inline]
    pub fn update_u256(&mut self, value: U256) {
        self.hasher.update(value.to_be_bytes::<32>());
    }

    /// Update with an address.
    #[inline]
    pub fn update_address(&mut self, value: &Address) {
        self.hasher.update(value.as_slice());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

// =============================================================================
// TESTS
// =============================================================================
