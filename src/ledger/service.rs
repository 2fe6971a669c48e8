//! Ledger Service
//!
//! Async front for concurrent submitters. Calls are serialized through a
//! single lock, so each operation sees the state left by the previous one
//! and re-checks its guards against it.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tokio::sync::Mutex;

use crate::core::hash::StateHash;
use crate::ledger::bounty::{Bounty, BountyId};
use crate::ledger::error::LedgerError;
use crate::ledger::events::LedgerEvent;
use crate::ledger::state::{BountyLedger, LedgerSnapshot};
use crate::proof::verify::ProofArtifact;

/// Cloneable handle to a shared ledger.
#[derive(Clone)]
pub struct LedgerService {
    ledger: Arc<Mutex<BountyLedger>>,
}

impl LedgerService {
    /// Wrap a ledger.
    pub fn new(ledger: BountyLedger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    /// See [`BountyLedger::create_bounty`].
    pub async fn create_bounty(
        &self,
        caller: Address,
        repository: &str,
        issue_number: u64,
        token: Address,
        amount: U256,
    ) -> Result<BountyId, LedgerError> {
        self.ledger
            .lock()
            .await
            .create_bounty(caller, repository, issue_number, token, amount)
    }

    /// See [`BountyLedger::assign_bounty`].
    pub async fn assign_bounty(&self, caller: Address, proof: &ProofArtifact) -> Result<BountyId, LedgerError> {
        self.ledger.lock().await.assign_bounty(caller, proof)
    }

    /// See [`BountyLedger::solve_bounty`].
    pub async fn solve_bounty(&self, caller: Address, id: BountyId, proof: &ProofArtifact) -> Result<U256, LedgerError> {
        self.ledger.lock().await.solve_bounty(caller, id, proof)
    }

    /// See [`BountyLedger::cancel_bounty`].
    pub async fn cancel_bounty(&self, caller: Address, id: BountyId) -> Result<(), LedgerError> {
        self.ledger.lock().await.cancel_bounty(caller, id)
    }

    /// See [`BountyLedger::report_bounty`].
    pub async fn report_bounty(&self, caller: Address, id: BountyId, proof: &ProofArtifact) -> Result<u64, LedgerError> {
        self.ledger.lock().await.report_bounty(caller, id, proof)
    }

    /// Run `f` with exclusive access, for governance calls and funding.
    pub async fn with_ledger<R>(&self, f: impl FnOnce(&mut BountyLedger) -> R) -> R {
        let mut guard = self.ledger.lock().await;
        f(&mut *guard)
    }

    /// Copy of a bounty.
    pub async fn bounty(&self, id: BountyId) -> Option<Bounty> {
        self.ledger.lock().await.bounty(&id).cloned()
    }

    /// Current persistable state.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.lock().await.snapshot()
    }

    /// Hash of the current state.
    pub async fn state_hash(&self) -> StateHash {
        self.ledger.lock().await.state_hash()
    }

    /// Drain pending events.
    pub async fn take_events(&self) -> Vec<LedgerEvent> {
        self.ledger.lock().await.take_events()
    }
}
