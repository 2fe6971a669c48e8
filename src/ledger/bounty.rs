//! Bounty Records
//!
//! One bounty per (repository, issue) pair, keyed by the same hash the
//! Solidity escrow uses: `keccak256(abi.encodePacked(repository, issue))`.

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;

/// Bounty key.
pub type BountyId = B256;

/// Derive the bounty key for `repository` and `issue_number`.
pub fn bounty_id(repository: &str, issue_number: u64) -> BountyId {
    let mut packed = Vec::with_capacity(repository.len() + 32);
    packed.extend_from_slice(repository.as_bytes());
    packed.extend_from_slice(&U256::from(issue_number).to_be_bytes::<32>());
    keccak256(packed)
}

/// Lifecycle of a bounty.
///
/// `Open → Assigned → Solved` and `Open/Assigned → Cancelled → Reported`.
/// `Solved` and `Reported` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BountyStatus {
    /// Escrowed, no PR recorded.
    Open = 0,
    /// Escrowed, closing PR recorded.
    Assigned = 1,
    /// Paid out.
    Solved = 2,
    /// Refunded to the creator.
    Cancelled = 3,
    /// Cancelled and reported; creator penalized.
    Reported = 4,
}

impl BountyStatus {
    /// No further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Solved | Self::Reported)
    }

    /// Funds are still held for this bounty.
    pub fn is_escrowed(self) -> bool {
        matches!(self, Self::Open | Self::Assigned)
    }
}

/// An escrowed bounty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    /// Key derived from repository and issue.
    pub id: BountyId,
    /// Repository, `owner/name`.
    pub repository: String,
    /// Tracked issue.
    pub issue_number: u64,
    /// PR recorded at assignment.
    pub pr_number: Option<u64>,
    /// Escrowed amount.
    pub amount: U256,
    /// Token the amount is denominated in.
    pub token: Address,
    /// Creator, refunded on cancel.
    pub creator: Address,
    /// Lifecycle state.
    pub status: BountyStatus,
}

impl Bounty {
    /// Create an open bounty.
    pub fn new(repository: String, issue_number: u64, token: Address, amount: U256, creator: Address) -> Self {
        Self {
            id: bounty_id(&repository, issue_number),
            repository,
            issue_number,
            pr_number: None,
            amount,
            token,
            creator,
            status: BountyStatus::Open,
        }
    }

    /// Paid out.
    pub fn solved(&self) -> bool {
        self.status == BountyStatus::Solved
    }

    /// Cancelled, whether or not it was later reported.
    pub fn cancelled(&self) -> bool {
        matches!(self.status, BountyStatus::Cancelled | BountyStatus::Reported)
    }

    /// Hash this bounty for state verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_bytes(self.id.as_slice());
        hasher.update_str(&self.repository);
        hasher.update_u64(self.issue_number);
        hasher.update_u64(self.pr_number.unwrap_or(0));
        hasher.update_u256(self.amount);
        hasher.update_address(&self.token);
        hasher.update_address(&self.creator);
        hasher.update_u8(self.status as u8);
    }
}
