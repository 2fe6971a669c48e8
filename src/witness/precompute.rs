//! Body Precompute Split
//!
//! The circuit only hashes the tail of the body. Everything before the
//! block that contains the boundary marker is hashed here and handed
//! over as an intermediate SHA-256 state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::WitnessError;
use super::padding::PaddedBlock;
use crate::core::hash::{partial_sha256, StateHash};
use crate::core::SHA256_BLOCK_LEN;

/// Prefix/suffix split of a padded body.
///
/// `prefix ++ suffix[..remaining_len] == padded_body.padded_message()`;
/// the rest of `suffix` is zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputeSplit {
    /// Split point in bytes, block aligned.
    pub cutoff: usize,
    /// Bytes hashed outside the circuit.
    pub prefix: Vec<u8>,
    /// Bytes hashed inside the circuit, zero-filled to capacity.
    pub suffix: Vec<u8>,
    /// Meaningful bytes in `suffix`.
    pub remaining_len: usize,
    /// SHA-256 state after compressing `prefix`.
    pub prefix_state: StateHash,
}

impl PrecomputeSplit {
    /// Split `body` at the block holding `marker`.
    pub fn split(
        body: &PaddedBlock,
        marker: &[u8],
        suffix_capacity: usize,
    ) -> Result<Self, WitnessError> {
        let index = find_subslice(body.bytes(), marker).ok_or(WitnessError::BoundaryNotFound)?;
        let cutoff = index / SHA256_BLOCK_LEN * SHA256_BLOCK_LEN;

        let remaining_len = body.padded_len() - cutoff;
        if remaining_len >= suffix_capacity {
            return Err(WitnessError::RemainingBodyTooLarge {
                remaining: remaining_len,
                max: suffix_capacity,
            });
        }

        let tail = &body.bytes()[cutoff..];
        if tail.len() % SHA256_BLOCK_LEN != 0 {
            return Err(WitnessError::MisalignedSuffix(tail.len()));
        }
        // Never truncate: the zero fill after the message must fit too
        if tail.len() > suffix_capacity {
            return Err(WitnessError::RemainingBodyTooLarge {
                remaining: tail.len(),
                max: suffix_capacity,
            });
        }

        let prefix = body.bytes()[..cutoff].to_vec();
        let mut suffix = tail.to_vec();
        suffix.resize(suffix_capacity, 0);

        let prefix_state = partial_sha256(&prefix).map_err(|e| WitnessError::MisalignedSuffix(e.0))?;

        debug!(cutoff, remaining_len, "split body for precompute");

        Ok(Self {
            cutoff,
            prefix,
            suffix,
            remaining_len,
            prefix_state,
        })
    }
}

/// First index of `needle` in `haystack`.
///
/// An empty needle matches at 0.
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::hash_bytes;
    use crate::witness::padding::sha256_pad;
    use proptest::prelude::*;

    const MARKER: &[u8] = b"----==_mimepart_";

    fn body_with_marker_at(offset: usize, tail: usize) -> Vec<u8> {
        let mut body = vec![b'a'; offset];
        body.extend_from_slice(MARKER);
        body.extend(std::iter::repeat(b'z').take(tail));
        body
    }

    #[test]
    fn test_find_subslice() {
        assert_eq!(find_subslice(b"hello world", b"world"), Some(6));
        assert_eq!(find_subslice(b"hello", b"xyz"), None);
        assert_eq!(find_subslice(b"ab", b"abc"), None);
        assert_eq!(find_subslice(b"abc", b""), Some(0));
        // Overlapping prefix must not skip a real match
        assert_eq!(find_subslice(b"aaab", b"aab"), Some(1));
    }

    #[test]
    fn test_cutoff_rounds_down() {
        let body = sha256_pad(&body_with_marker_at(130, 40), 512).unwrap();
        let split = PrecomputeSplit::split(&body, MARKER, 512).unwrap();

        assert_eq!(split.cutoff, 128);
        assert_eq!(split.prefix.len(), 128);
        assert_eq!(split.suffix.len(), 512);
        assert_eq!(split.remaining_len, body.padded_len() - 128);
    }

    #[test]
    fn test_marker_at_start_uses_iv() {
        let body = sha256_pad(&body_with_marker_at(0, 10), 128).unwrap();
        let split = PrecomputeSplit::split(&body, MARKER, 128).unwrap();

        assert_eq!(split.cutoff, 0);
        assert!(split.prefix.is_empty());
        assert_eq!(split.prefix_state, partial_sha256(&[]).unwrap());
    }

    #[test]
    fn test_missing_marker() {
        let body = sha256_pad(b"no boundary here", 128).unwrap();
        assert_eq!(
            PrecomputeSplit::split(&body, MARKER, 128),
            Err(WitnessError::BoundaryNotFound)
        );
    }

    #[test]
    fn test_remaining_must_be_below_capacity() {
        // 119 bytes pad to 128; a 128 byte suffix buffer is not enough
        let body = sha256_pad(&body_with_marker_at(0, 103), 128).unwrap();
        assert_eq!(body.padded_len(), 128);
        assert_eq!(
            PrecomputeSplit::split(&body, MARKER, 128),
            Err(WitnessError::RemainingBodyTooLarge { remaining: 128, max: 128 })
        );
    }

    #[test]
    fn test_zero_fill_larger_than_suffix_rejected() {
        let body = sha256_pad(&body_with_marker_at(0, 10), 256).unwrap();
        assert_eq!(
            PrecomputeSplit::split(&body, MARKER, 128),
            Err(WitnessError::RemainingBodyTooLarge { remaining: 256, max: 128 })
        );
    }

    #[test]
    fn test_suffix_resumes_prefix_hash() {
        let message = body_with_marker_at(200, 50);
        let body = sha256_pad(&message, 512).unwrap();
        let split = PrecomputeSplit::split(&body, MARKER, 512).unwrap();

        let mut rejoined = split.prefix.clone();
        rejoined.extend_from_slice(&split.suffix[..split.remaining_len]);
        assert_eq!(rejoined, body.padded_message());
        assert_eq!(partial_sha256(&rejoined).unwrap(), hash_bytes(&message));
    }

    proptest! {
        #[test]
        fn prop_alignment_invariant(offset in 0usize..400, tail in 0usize..100) {
            let body = sha256_pad(&body_with_marker_at(offset, tail), 640).unwrap();
            let split = PrecomputeSplit::split(&body, MARKER, 640).unwrap();

            prop_assert_eq!(split.cutoff % 64, 0);
            prop_assert!(split.cutoff <= offset);
            prop_assert!(offset - split.cutoff < 64);
            prop_assert_eq!(split.suffix.len() % 64, 0);
            prop_assert!(split.remaining_len < 640);
            prop_assert!(split.suffix[split.remaining_len..].iter().all(|&b| b == 0));
        }
    }
}
