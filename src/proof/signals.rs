//! Proof Public Signals
//!
//! Fixed-layout field element arrays exposed by the email circuits.
//! Position encodes meaning; text fields are packed 7 ASCII bytes per element.
//!
//! ```text
//! common   [0] signature valid   [1] selectors found   [2] key commitment
//!          [3..7)  sender address
//! issue    [7..17) repository    [17] issue number     [18] closing PR
//! merged   [7..15) repository    [15] merged PR        [16] recipient
//! ```

use std::ops::Range;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::core::pack::{pack_bytes, PACK_SIZE};

/// BN254 scalar field modulus. Every signal must be strictly below it.
pub const SNARK_SCALAR_FIELD: U256 = U256::from_limbs([
    0x43e1_f593_f000_0001,
    0x2833_e848_79b9_7091,
    0xb850_45b6_8181_585d,
    0x3064_4e72_e131_a029,
]);

/// The "true" field element used by circuit flags.
pub const FLAG_TRUE: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Signature-valid flag position.
pub const SIGNATURE_FLAG: usize = 0;
/// Selector-found flag position.
pub const SELECTOR_FLAG: usize = 1;
/// Public key commitment position.
pub const KEY_COMMITMENT: usize = 2;
/// Sender address span.
pub const SENDER: Range<usize> = 3..7;

/// Issue-closed layout.
pub mod issue_closed {
    use std::ops::Range;

    /// Repository span (10 elements, 70 bytes).
    pub const REPOSITORY: Range<usize> = 7..17;
    /// Issue number position.
    pub const ISSUE_NUMBER: usize = 17;
    /// Closing PR number position.
    pub const PR_NUMBER: usize = 18;
    /// Total signal count.
    pub const LEN: usize = 19;
}

/// PR-merged layout.
pub mod pr_merged {
    use std::ops::Range;

    /// Repository span (8 elements, 56 bytes).
    pub const REPOSITORY: Range<usize> = 7..15;
    /// Merged PR number position.
    pub const PR_NUMBER: usize = 15;
    /// Recipient address position (160-bit integer).
    pub const RECIPIENT: usize = 16;
    /// Total signal count.
    pub const LEN: usize = 17;
}

/// Longest repository name, in bytes, that fits both layouts.
///
/// The PR-merged span is the narrower one; a bounty on a longer name
/// could be assigned but never solved.
pub const MAX_REPOSITORY_LEN: usize = (pr_merged::REPOSITORY.end - pr_merged::REPOSITORY.start) * PACK_SIZE;

/// The two proof kinds the ledger accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofKind {
    /// Issue closed by a pull request.
    IssueClosed,
    /// Pull request merged.
    PrMerged,
}

impl ProofKind {
    /// Number of public signals for this kind.
    pub const fn signal_count(self) -> usize {
        match self {
            Self::IssueClosed => issue_closed::LEN,
            Self::PrMerged => pr_merged::LEN,
        }
    }

    /// Repository span for this kind.
    pub fn repository_span(self) -> Range<usize> {
        match self {
            Self::IssueClosed => issue_closed::REPOSITORY,
            Self::PrMerged => pr_merged::REPOSITORY,
        }
    }
}

/// Errors building a signal array.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// Element is not a canonical field element.
    #[error("signal {index} is not below the scalar field modulus")]
    OutOfField {
        /// Offending position.
        index: usize,
    },
    /// Text does not fit the slots reserved for it.
    #[error("{field} of {len} bytes exceeds {max} bytes")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Actual length.
        len: usize,
        /// Capacity.
        max: usize,
    },
    /// Serialized form has the wrong size.
    #[error("invalid signal encoding of {0} bytes")]
    InvalidEncoding(usize),
}

/// Public signals returned alongside a proof.
///
/// Immutable once constructed; all elements are canonical field elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicSignals(Vec<U256>);

impl PublicSignals {
    /// Wrap a signal vector, rejecting non-canonical elements.
    pub fn new(values: Vec<U256>) -> Result<Self, SignalError> {
        if let Some(index) = values.iter().position(|v| *v >= SNARK_SCALAR_FIELD) {
            return Err(SignalError::OutOfField { index });
        }
        Ok(Self(values))
    }

    /// All elements in order.
    pub fn as_slice(&self) -> &[U256] {
        &self.0
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to bytes (32 bytes big-endian per element).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() * 32);
        for value in &self.0 {
            bytes.extend_from_slice(&value.to_be_bytes::<32>());
        }
        bytes
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SignalError> {
        if data.len() % 32 != 0 {
            return Err(SignalError::InvalidEncoding(data.len()));
        }
        let values = data.chunks_exact(32).map(U256::from_be_slice).collect();
        Self::new(values)
    }
}

/// Facts an issue-closed proof exposes, before packing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueClosedSignals {
    /// Commitment to the DKIM public key.
    pub key_commitment: U256,
    /// Sender address from the `from:` header.
    pub sender: String,
    /// Repository from the `to:` header.
    pub repository: String,
    /// Closed issue number.
    pub issue_number: u64,
    /// PR that closed the issue.
    pub pr_number: u64,
}

impl IssueClosedSignals {
    /// Encode to the issue-closed layout with both flags set.
    pub fn encode(&self) -> Result<PublicSignals, SignalError> {
        let mut arr = common_prefix(self.key_commitment, &self.sender)?;
        arr.extend(pack_field("repository", self.repository.as_bytes(), issue_closed::REPOSITORY.len())?);
        arr.extend(pack_number("issue number", self.issue_number)?);
        arr.extend(pack_number("pr number", self.pr_number)?);

        debug_assert_eq!(arr.len(), issue_closed::LEN);
        PublicSignals::new(arr)
    }
}

/// Facts a PR-merged proof exposes, before packing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrMergedSignals {
    /// Commitment to the DKIM public key.
    pub key_commitment: U256,
    /// Sender address from the `from:` header.
    pub sender: String,
    /// Repository from the `to:` header.
    pub repository: String,
    /// Merged PR number.
    pub pr_number: u64,
    /// Payout address bound into the proof.
    pub recipient: Address,
}

impl PrMergedSignals {
    /// Encode to the PR-merged layout with both flags set.
    pub fn encode(&self) -> Result<PublicSignals, SignalError> {
        let mut arr = common_prefix(self.key_commitment, &self.sender)?;
        arr.extend(pack_field("repository", self.repository.as_bytes(), pr_merged::REPOSITORY.len())?);
        arr.extend(pack_number("pr number", self.pr_number)?);
        arr.push(address_to_field(&self.recipient));

        debug_assert_eq!(arr.len(), pr_merged::LEN);
        PublicSignals::new(arr)
    }
}

/// Encode an address as a 160-bit field element.
pub fn address_to_field(address: &Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

/// Decode a 160-bit field element into an address.
pub fn field_to_address(value: U256) -> Option<Address> {
    let be = value.to_be_bytes::<32>();
    if be[..12].iter().any(|&b| b != 0) {
        return None;
    }
    Some(Address::from_slice(&be[12..]))
}

fn common_prefix(key_commitment: U256, sender: &str) -> Result<Vec<U256>, SignalError> {
    let mut arr = Vec::with_capacity(issue_closed::LEN);
    arr.push(FLAG_TRUE);
    arr.push(FLAG_TRUE);
    arr.push(key_commitment);
    arr.extend(pack_field("sender", sender.as_bytes(), SENDER.len())?);
    Ok(arr)
}

fn pack_field(field: &'static str, bytes: &[u8], slots: usize) -> Result<Vec<U256>, SignalError> {
    pack_bytes(bytes, slots).ok_or(SignalError::FieldTooLong {
        field,
        len: bytes.len(),
        max: slots * PACK_SIZE,
    })
}

fn pack_number(field: &'static str, value: u64) -> Result<Vec<U256>, SignalError> {
    pack_field(field, value.to_string().as_bytes(), 1)
}
