//! Ledger errors.

use alloy_primitives::Address;
use thiserror::Error;

use crate::ledger::bounty::BountyId;
use crate::ledger::vault::VaultError;
use crate::proof::processor::ProcessorError;

/// Errors from ledger operations. A failed call has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A bounty already exists for the key.
    #[error("bounty already exists: {0}")]
    AlreadyExists(BountyId),
    /// Creator is serving a penalty.
    #[error("issuer {creator} is blocked until {until}")]
    CreatorBlocked {
        /// Penalized creator.
        creator: Address,
        /// Unix seconds the penalty ends at.
        until: u64,
    },
    /// Argument outside the accepted range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// No bounty for the key.
    #[error("bounty not exists: {0}")]
    NotFound(BountyId),
    /// Bounty is solved or reported.
    #[error("bounty already solved: {0}")]
    AlreadyTerminal(BountyId),
    /// Bounty already has a closing PR recorded.
    #[error("bounty already assigned: {0}")]
    AlreadyAssigned(BountyId),
    /// Bounty was cancelled.
    #[error("bounty already cancelled: {0}")]
    BountyCancelled(BountyId),
    /// Proven repository does not hash to the bounty key.
    #[error("bounty id mismatch: expected {expected}, proof gives {got}")]
    KeyMismatch {
        /// Bounty key.
        expected: BountyId,
        /// Key derived from the proof.
        got: BountyId,
    },
    /// Proven PR differs from the recorded one.
    #[error("bounty prNo mismatch: recorded {recorded:?}, proof gives {got}")]
    PrNumberMismatch {
        /// PR recorded at assignment.
        recorded: Option<u64>,
        /// PR from the proof.
        got: u64,
    },
    /// Caller is not the bounty creator.
    #[error("not issuer")]
    NotIssuer,
    /// Bounty is not in the cancelled state.
    #[error("bounty not cancelled")]
    NotCancelled,
    /// Caller is not the admin.
    #[error("caller {0} is not the admin")]
    Unauthorized(Address),
    /// Proof rejected.
    #[error(transparent)]
    Proof(#[from] ProcessorError),
    /// Token movement failed.
    #[error(transparent)]
    Vault(#[from] VaultError),
    /// Snapshot could not be encoded or decoded.
    #[error("snapshot codec error: {0}")]
    Snapshot(String),
}
