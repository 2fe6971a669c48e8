//! Ledger Events
//!
//! Emitted on every successful state change, drained with `take_events`.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::ledger::bounty::BountyId;

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventData {
    /// Bounty escrowed.
    BountyCreated {
        /// Bounty key.
        id: BountyId,
        /// Repository as `owner/name`.
        repository: String,
        /// Issue the bounty is on.
        issue_number: u64,
        /// Escrowed amount.
        amount: U256,
        /// Escrowed token.
        token: Address,
        /// Funder.
        creator: Address,
    },

    /// Closing PR recorded.
    BountyAssigned {
        /// Bounty key.
        id: BountyId,
        /// PR that closed the issue.
        pr_number: u64,
        /// Submitter of the issue-closed proof.
        assignee: Address,
    },

    /// Bounty paid out.
    BountySolved {
        /// Bounty key.
        id: BountyId,
        /// Submitter of the PR-merged proof.
        solver: Address,
        /// Address bound in the proof.
        recipient: Address,
        /// Amount paid after the fee.
        payout: U256,
        /// Protocol fee retained.
        fee: U256,
    },

    /// Bounty refunded.
    BountyCancelled {
        /// Bounty key.
        id: BountyId,
        /// Refunded funder.
        creator: Address,
    },

    /// Cancelled bounty reported; creator penalized.
    BountyReported {
        /// Bounty key.
        id: BountyId,
        /// Submitter of the PR-merged proof.
        reporter: Address,
        /// Penalized funder.
        creator: Address,
        /// Unix seconds the penalty ends at.
        penalty_until: u64,
    },

    /// Protocol fee changed.
    ProtocolFeeUpdated {
        /// New fee in basis points.
        fee_bps: u64,
    },

    /// Fee recipient changed.
    FeeRecipientUpdated {
        /// New fee recipient.
        recipient: Address,
    },

    /// Penalty period changed.
    PenaltyPeriodUpdated {
        /// New period.
        seconds: u64,
    },

    /// Issue-closed processor replaced.
    IssueProcessorUpdated,

    /// PR-merged processor replaced.
    PrProcessorUpdated,

    /// Accrued fees paid to the fee recipient.
    ProtocolFeeWithdrawn {
        /// Withdrawn token.
        token: Address,
        /// Fee recipient paid.
        recipient: Address,
        /// Amount paid.
        amount: U256,
    },

    /// Admin role handed over.
    AdminTransferred {
        /// Outgoing admin.
        previous: Address,
        /// Incoming admin.
        admin: Address,
    },
}

/// An event with the ledger time it occurred at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unix seconds.
    pub timestamp: u64,

    /// Event data
    pub data: LedgerEventData,
}

impl LedgerEvent {
    /// Create a new event.
    pub fn new(timestamp: u64, data: LedgerEventData) -> Self {
        Self { timestamp, data }
    }

    /// Bounty this event concerns, if any.
    pub fn bounty_id(&self) -> Option<BountyId> {
        match &self.data {
            LedgerEventData::BountyCreated { id, .. }
            | LedgerEventData::BountyAssigned { id, .. }
            | LedgerEventData::BountySolved { id, .. }
            | LedgerEventData::BountyCancelled { id, .. }
            | LedgerEventData::BountyReported { id, .. } => Some(*id),
            _ => None,
        }
    }
}
