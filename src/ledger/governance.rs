//! Governance & Fee Accounting
//!
//! Admin-only parameter setters and protocol fee withdrawal.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MAX_PROTOCOL_FEE_BPS;
use crate::ledger::error::LedgerError;
use crate::ledger::events::LedgerEventData;
use crate::ledger::state::{BountyLedger, IssueProcessorRef, PrProcessorRef};

/// Basis point denominator (10 000 = 100%).
pub const FEE_DENOMINATOR: u64 = 10_000;

/// Ledger governance parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Only identity allowed to change parameters.
    pub admin: Address,
    /// Fee taken from each payout, in basis points.
    pub protocol_fee_bps: u64,
    /// Receives withdrawn fees.
    pub fee_recipient: Address,
    /// Creator penalty after a successful report, in seconds.
    pub penalty_period: u64,
}

impl GovernanceParams {
    /// Protocol fee on `amount`, rounded down.
    pub fn fee_for(&self, amount: U256) -> U256 {
        let bps = U256::from(self.protocol_fee_bps);
        let denominator = U256::from(FEE_DENOMINATOR);
        match amount.checked_mul(bps) {
            Some(scaled) => scaled / denominator,
            None => amount / denominator * bps,
        }
    }
}

/// Reject fees at or above the 10% ceiling.
pub(super) fn check_fee_bps(fee_bps: u64) -> Result<(), LedgerError> {
    if fee_bps >= MAX_PROTOCOL_FEE_BPS {
        return Err(LedgerError::InvalidParameter(format!(
            "protocol fee {fee_bps} bps must be below {MAX_PROTOCOL_FEE_BPS}"
        )));
    }
    Ok(())
}

impl BountyLedger {
    fn ensure_admin(&self, caller: Address) -> Result<(), LedgerError> {
        if caller != self.params.admin {
            return Err(LedgerError::Unauthorized(caller));
        }
        Ok(())
    }

    /// Set the protocol fee. Values at or above 10% are rejected.
    pub fn set_protocol_fee(&mut self, caller: Address, fee_bps: u64) -> Result<(), LedgerError> {
        self.ensure_admin(caller)?;
        check_fee_bps(fee_bps)?;

        self.params.protocol_fee_bps = fee_bps;
        info!(fee_bps, "protocol fee updated");
        self.push_event(LedgerEventData::ProtocolFeeUpdated { fee_bps });
        Ok(())
    }

    /// Set the fee recipient. The zero address is rejected.
    pub fn set_fee_recipient(&mut self, caller: Address, recipient: Address) -> Result<(), LedgerError> {
        self.ensure_admin(caller)?;
        if recipient.is_zero() {
            return Err(LedgerError::InvalidParameter("fee recipient is the zero address".into()));
        }

        self.params.fee_recipient = recipient;
        info!(recipient = %recipient, "fee recipient updated");
        self.push_event(LedgerEventData::FeeRecipientUpdated { recipient });
        Ok(())
    }

    /// Set the penalty period in seconds.
    pub fn set_penalty_period(&mut self, caller: Address, seconds: u64) -> Result<(), LedgerError> {
        self.ensure_admin(caller)?;

        self.params.penalty_period = seconds;
        info!(seconds, "penalty period updated");
        self.push_event(LedgerEventData::PenaltyPeriodUpdated { seconds });
        Ok(())
    }

    /// Replace the issue-closed processor.
    pub fn set_issue_processor(&mut self, caller: Address, processor: IssueProcessorRef) -> Result<(), LedgerError> {
        self.ensure_admin(caller)?;

        self.issue_processor = processor;
        info!("issue processor updated");
        self.push_event(LedgerEventData::IssueProcessorUpdated);
        Ok(())
    }

    /// Replace the PR-merged processor.
    pub fn set_pr_processor(&mut self, caller: Address, processor: PrProcessorRef) -> Result<(), LedgerError> {
        self.ensure_admin(caller)?;

        self.pr_processor = processor;
        info!("pr processor updated");
        self.push_event(LedgerEventData::PrProcessorUpdated);
        Ok(())
    }

    /// Pay all accrued fees in `token` to the fee recipient.
    ///
    /// Returns the amount withdrawn.
    pub fn withdraw_protocol_fee(&mut self, caller: Address, token: Address) -> Result<U256, LedgerError> {
        self.ensure_admin(caller)?;

        let amount = self.fee_balance(token);
        let recipient = self.params.fee_recipient;
        if recipient == self.custody {
            return Err(LedgerError::InvalidParameter("fee recipient is the custody address".into()));
        }
        self.vault.transfer(token, self.custody, recipient, amount)?;
        self.fee_balances.remove(&token);

        info!(token = %token, recipient = %recipient, amount = %amount, "protocol fee withdrawn");
        self.push_event(LedgerEventData::ProtocolFeeWithdrawn { token, recipient, amount });
        Ok(amount)
    }

    /// Hand the admin role to `admin`. The zero address is rejected.
    pub fn transfer_admin(&mut self, caller: Address, admin: Address) -> Result<(), LedgerError> {
        self.ensure_admin(caller)?;
        if admin.is_zero() {
            return Err(LedgerError::InvalidParameter("admin is the zero address".into()));
        }

        let previous = self.params.admin;
        self.params.admin = admin;
        info!(previous = %previous, admin = %admin, "admin transferred");
        self.push_event(LedgerEventData::AdminTransferred { previous, admin });
        Ok(())
    }
}
