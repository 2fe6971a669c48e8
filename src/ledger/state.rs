//! Bounty Ledger State
//!
//! Proof-gated escrow state machine. Every operation checks all of its
//! guards against current state, performs its single token movement, and
//! only then mutates bounty state. A failed call changes nothing.
//!
//! Uses BTreeMap throughout so snapshots and state hashes are deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::core::hash::{StateHash, StateHasher};
use crate::ledger::bounty::{bounty_id, Bounty, BountyId, BountyStatus};
use crate::ledger::clock::Clock;
use crate::ledger::error::LedgerError;
use crate::ledger::events::{LedgerEvent, LedgerEventData};
use crate::ledger::governance::{check_fee_bps, GovernanceParams};
use crate::ledger::vault::TokenVault;
use crate::proof::processor::{IssueClosedFact, PrMergedFact, ProcessorError, ProofProcessor};
use crate::proof::signals::MAX_REPOSITORY_LEN;
use crate::proof::verify::ProofArtifact;

/// Shared issue-closed processor.
pub type IssueProcessorRef = Arc<dyn ProofProcessor<Fact = IssueClosedFact>>;

/// Shared PR-merged processor.
pub type PrProcessorRef = Arc<dyn ProofProcessor<Fact = PrMergedFact>>;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Persistable ledger state: bounties, penalties, and fee balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// All bounties, ordered by key.
    pub bounties: Vec<Bounty>,
    /// Penalty end per creator.
    pub penalties: BTreeMap<Address, u64>,
    /// Accrued protocol fees per token.
    pub fee_balances: BTreeMap<Address, U256>,
}

impl LedgerSnapshot {
    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(data).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Hash of the snapshot in canonical field order.
    pub fn state_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_ledger_state();

        hasher.update_u64(self.bounties.len() as u64);
        for bounty in &self.bounties {
            bounty.hash_into(&mut hasher);
        }

        hasher.update_u64(self.penalties.len() as u64);
        for (creator, until) in &self.penalties {
            hasher.update_address(creator);
            hasher.update_u64(*until);
        }

        hasher.update_u64(self.fee_balances.len() as u64);
        for (token, balance) in &self.fee_balances {
            hasher.update_address(token);
            hasher.update_u256(*balance);
        }

        hasher.finalize()
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Escrow ledger for proof-gated bounties.
pub struct BountyLedger {
    /// Governance parameters
    pub(super) params: GovernanceParams,

    /// Address holding escrowed funds and accrued fees
    pub(super) custody: Address,

    /// Bounties by key (BTreeMap for deterministic iteration)
    pub(super) bounties: BTreeMap<BountyId, Bounty>,

    /// Penalty end per creator
    pub(super) penalties: BTreeMap<Address, u64>,

    /// Accrued protocol fees per token
    pub(super) fee_balances: BTreeMap<Address, U256>,

    /// Token balances
    pub(super) vault: TokenVault,

    pub(super) issue_processor: IssueProcessorRef,
    pub(super) pr_processor: PrProcessorRef,
    pub(super) clock: Arc<dyn Clock>,

    /// Events since the last `take_events`
    pub(super) pending_events: Vec<LedgerEvent>,
}

impl BountyLedger {
    /// Create an empty ledger.
    ///
    /// `admin` also receives protocol fees until changed. Fails when the
    /// configured fee is at or above the ceiling.
    pub fn new(
        config: &LedgerConfig,
        admin: Address,
        custody: Address,
        issue_processor: IssueProcessorRef,
        pr_processor: PrProcessorRef,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        check_fee_bps(config.protocol_fee_bps)?;

        Ok(Self {
            params: GovernanceParams {
                admin,
                protocol_fee_bps: config.protocol_fee_bps,
                fee_recipient: admin,
                penalty_period: config.penalty_period_secs,
            },
            custody,
            bounties: BTreeMap::new(),
            penalties: BTreeMap::new(),
            fee_balances: BTreeMap::new(),
            vault: TokenVault::new(),
            issue_processor,
            pr_processor,
            clock,
            pending_events: Vec::new(),
        })
    }

    // =========================================================================
    // Bounty lifecycle
    // =========================================================================

    /// Escrow `amount` of `token` from `caller` for an issue.
    pub fn create_bounty(
        &mut self,
        caller: Address,
        repository: &str,
        issue_number: u64,
        token: Address,
        amount: U256,
    ) -> Result<BountyId, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidParameter("bounty amount must be positive".into()));
        }
        if repository.is_empty() {
            return Err(LedgerError::InvalidParameter("repository must not be empty".into()));
        }
        if repository.len() > MAX_REPOSITORY_LEN {
            return Err(LedgerError::InvalidParameter(format!(
                "repository is {} bytes, at most {MAX_REPOSITORY_LEN} fit a proof",
                repository.len()
            )));
        }
        if caller == self.custody {
            return Err(LedgerError::InvalidParameter("custody cannot fund a bounty".into()));
        }

        let id = bounty_id(repository, issue_number);
        if self.bounties.contains_key(&id) {
            return Err(LedgerError::AlreadyExists(id));
        }
        if let Some(until) = self.active_penalty(caller) {
            return Err(LedgerError::CreatorBlocked { creator: caller, until });
        }

        self.vault.transfer(token, caller, self.custody, amount)?;

        let bounty = Bounty::new(repository.to_string(), issue_number, token, amount, caller);
        self.bounties.insert(id, bounty);

        info!(
            bounty = %hex::encode(id),
            repository,
            issue_number,
            amount = %amount,
            "bounty created"
        );
        self.push_event(LedgerEventData::BountyCreated {
            id,
            repository: repository.to_string(),
            issue_number,
            amount,
            token,
            creator: caller,
        });
        Ok(id)
    }

    /// Record the closing PR proven by an issue-closed proof.
    pub fn assign_bounty(&mut self, caller: Address, proof: &ProofArtifact) -> Result<BountyId, LedgerError> {
        let fact = self.issue_processor.process(proof).map_err(rejected)?;
        let id = bounty_id(&fact.repository, fact.issue_number);

        let bounty = self.bounties.get_mut(&id).ok_or(LedgerError::NotFound(id))?;
        if bounty.status.is_terminal() {
            return Err(LedgerError::AlreadyTerminal(id));
        }
        if bounty.pr_number.is_some() {
            return Err(LedgerError::AlreadyAssigned(id));
        }

        bounty.pr_number = Some(fact.pr_number);
        // A cancelled bounty keeps its status; the PR is kept for reporting
        if bounty.status == BountyStatus::Open {
            bounty.status = BountyStatus::Assigned;
        }

        info!(bounty = %hex::encode(id), pr_number = fact.pr_number, "bounty assigned");
        self.push_event(LedgerEventData::BountyAssigned {
            id,
            pr_number: fact.pr_number,
            assignee: caller,
        });
        Ok(id)
    }

    /// Pay out a bounty against a PR-merged proof. Returns the payout.
    pub fn solve_bounty(&mut self, caller: Address, id: BountyId, proof: &ProofArtifact) -> Result<U256, LedgerError> {
        let fact = self.pr_processor.process(proof).map_err(rejected)?;

        let bounty = self.bounties.get(&id).ok_or(LedgerError::NotFound(id))?;
        match bounty.status {
            BountyStatus::Cancelled => return Err(LedgerError::BountyCancelled(id)),
            BountyStatus::Solved | BountyStatus::Reported => return Err(LedgerError::AlreadyTerminal(id)),
            BountyStatus::Open | BountyStatus::Assigned => {}
        }
        check_proof_matches(bounty, &fact)?;
        if fact.recipient == self.custody {
            return Err(LedgerError::InvalidParameter("custody cannot receive a payout".into()));
        }

        let (token, amount) = (bounty.token, bounty.amount);
        let fee = self.params.fee_for(amount);
        let payout = amount.saturating_sub(fee);

        self.vault.transfer(token, self.custody, fact.recipient, payout)?;

        let balance = self.fee_balances.entry(token).or_insert(U256::ZERO);
        *balance = balance.saturating_add(fee);
        if let Some(bounty) = self.bounties.get_mut(&id) {
            bounty.status = BountyStatus::Solved;
        }

        info!(
            bounty = %hex::encode(id),
            recipient = %fact.recipient,
            payout = %payout,
            fee = %fee,
            "bounty solved"
        );
        self.push_event(LedgerEventData::BountySolved {
            id,
            solver: caller,
            recipient: fact.recipient,
            payout,
            fee,
        });
        Ok(payout)
    }

    /// Refund a bounty to its creator.
    pub fn cancel_bounty(&mut self, caller: Address, id: BountyId) -> Result<(), LedgerError> {
        let bounty = self
            .bounties
            .get(&id)
            .filter(|b| b.creator == caller)
            .ok_or(LedgerError::NotIssuer)?;
        match bounty.status {
            BountyStatus::Solved | BountyStatus::Reported => return Err(LedgerError::AlreadyTerminal(id)),
            BountyStatus::Cancelled => return Err(LedgerError::BountyCancelled(id)),
            BountyStatus::Open | BountyStatus::Assigned => {}
        }

        let (token, amount) = (bounty.token, bounty.amount);
        self.vault.transfer(token, self.custody, caller, amount)?;
        if let Some(bounty) = self.bounties.get_mut(&id) {
            bounty.status = BountyStatus::Cancelled;
        }

        info!(bounty = %hex::encode(id), amount = %amount, "bounty cancelled");
        self.push_event(LedgerEventData::BountyCancelled { id, creator: caller });
        Ok(())
    }

    /// Penalize the creator of a cancelled bounty whose PR was merged.
    ///
    /// Returns the time the penalty ends at.
    pub fn report_bounty(&mut self, caller: Address, id: BountyId, proof: &ProofArtifact) -> Result<u64, LedgerError> {
        let bounty = self
            .bounties
            .get(&id)
            .filter(|b| b.status == BountyStatus::Cancelled)
            .ok_or(LedgerError::NotCancelled)?;

        let fact = self.pr_processor.process(proof).map_err(rejected)?;
        check_proof_matches(bounty, &fact)?;

        let creator = bounty.creator;
        let until = self.clock.now().saturating_add(self.params.penalty_period);
        self.penalties.insert(creator, until);
        if let Some(bounty) = self.bounties.get_mut(&id) {
            bounty.status = BountyStatus::Reported;
        }

        info!(
            bounty = %hex::encode(id),
            creator = %creator,
            penalty_until = until,
            "bounty reported"
        );
        self.push_event(LedgerEventData::BountyReported {
            id,
            reporter: caller,
            creator,
            penalty_until: until,
        });
        Ok(until)
    }

    /// Fund `holder` with newly issued `token`, standing in for an
    /// external token transfer into the ledger's view.
    pub fn deposit(&mut self, token: Address, holder: Address, amount: U256) -> Result<(), LedgerError> {
        self.vault.mint(token, holder, amount)?;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Bounty by key.
    pub fn bounty(&self, id: &BountyId) -> Option<&Bounty> {
        self.bounties.get(id)
    }

    /// Bounty by repository and issue.
    pub fn bounty_by_key(&self, repository: &str, issue_number: u64) -> Option<&Bounty> {
        self.bounties.get(&bounty_id(repository, issue_number))
    }

    /// All bounties, ordered by key.
    pub fn bounties(&self) -> impl Iterator<Item = &Bounty> {
        self.bounties.values()
    }

    /// Recorded penalty end for `creator`, expired or not.
    pub fn penalty_until(&self, creator: Address) -> Option<u64> {
        self.penalties.get(&creator).copied()
    }

    /// Whether `creator` may not create bounties right now.
    pub fn is_blocked(&self, creator: Address) -> bool {
        self.active_penalty(creator).is_some()
    }

    /// Accrued, unwithdrawn protocol fees in `token`.
    pub fn fee_balance(&self, token: Address) -> U256 {
        self.fee_balances.get(&token).copied().unwrap_or(U256::ZERO)
    }

    /// Governance parameters.
    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    /// Sum of amounts still escrowed in `token`.
    pub fn total_escrowed(&self, token: Address) -> U256 {
        self.bounties
            .values()
            .filter(|b| b.token == token && b.status.is_escrowed())
            .fold(U256::ZERO, |acc, b| acc.saturating_add(b.amount))
    }

    /// Custody address.
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Token balances.
    pub fn vault(&self) -> &TokenVault {
        &self.vault
    }

    /// Current ledger time.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Persistable state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            bounties: self.bounties.values().cloned().collect(),
            penalties: self.penalties.clone(),
            fee_balances: self.fee_balances.clone(),
        }
    }

    /// Hash of the persistable state.
    pub fn state_hash(&self) -> StateHash {
        self.snapshot().state_hash()
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub(super) fn push_event(&mut self, data: LedgerEventData) {
        let event = LedgerEvent::new(self.clock.now(), data);
        self.pending_events.push(event);
    }

    fn active_penalty(&self, creator: Address) -> Option<u64> {
        let now = self.clock.now();
        self.penalties.get(&creator).copied().filter(|&until| now < until)
    }
}

/// Cross-check a PR-merged fact against a stored bounty.
fn check_proof_matches(bounty: &Bounty, fact: &PrMergedFact) -> Result<(), LedgerError> {
    let derived = bounty_id(&fact.repository, bounty.issue_number);
    if derived != bounty.id {
        return Err(LedgerError::KeyMismatch {
            expected: bounty.id,
            got: derived,
        });
    }

    // Bounties cancelled before assignment have no PR to compare against
    let mismatch = match (bounty.status, bounty.pr_number) {
        (BountyStatus::Cancelled, None) => false,
        (_, recorded) => recorded != Some(fact.pr_number),
    };
    if mismatch {
        return Err(LedgerError::PrNumberMismatch {
            recorded: bounty.pr_number,
            got: fact.pr_number,
        });
    }
    Ok(())
}

fn rejected(err: ProcessorError) -> LedgerError {
    warn!(error = %err, "proof rejected");
    LedgerError::Proof(err)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::clock::ManualClock;
    use crate::proof::signals::{IssueClosedSignals, PrMergedSignals};
    use crate::proof::verify::Groth16Proof;

    const TOKEN: Address = Address::new([0x70; 20]);
    const ADMIN: Address = Address::new([0xAD; 20]);
    const CUSTODY: Address = Address::new([0xCC; 20]);
    const CREATOR: Address = Address::new([0x01; 20]);
    const SOLVER: Address = Address::new([0x02; 20]);
    const RECIPIENT: Address = Address::new([0x03; 20]);

    /// Decodes signals without a verifier, for ledger-only tests.
    struct TrustingIssueProcessor;

    impl ProofProcessor for TrustingIssueProcessor {
        type Fact = IssueClosedFact;

        fn kind(&self) -> crate::proof::ProofKind {
            crate::proof::ProofKind::IssueClosed
        }

        fn decode(&self, signals: &crate::proof::PublicSignals) -> Result<IssueClosedFact, ProcessorError> {
            let arr = signals.as_slice();
            let repository = crate::core::unpack_string(&arr[7..17]).map_err(|_| ProcessorError::ProofInvalid)?;
            let issue_number = crate::core::unpack_number(&arr[17..18]).map_err(|_| ProcessorError::ProofInvalid)?;
            let pr_number = crate::core::unpack_number(&arr[18..19]).map_err(|_| ProcessorError::ProofInvalid)?;
            Ok(IssueClosedFact { repository, issue_number, pr_number })
        }

        fn process(&self, artifact: &ProofArtifact) -> Result<IssueClosedFact, ProcessorError> {
            self.decode(&artifact.signals)
        }
    }

    struct TrustingPrProcessor;

    impl ProofProcessor for TrustingPrProcessor {
        type Fact = PrMergedFact;

        fn kind(&self) -> crate::proof::ProofKind {
            crate::proof::ProofKind::PrMerged
        }

        fn decode(&self, signals: &crate::proof::PublicSignals) -> Result<PrMergedFact, ProcessorError> {
            let arr = signals.as_slice();
            let repository = crate::core::unpack_string(&arr[7..15]).map_err(|_| ProcessorError::ProofInvalid)?;
            let pr_number = crate::core::unpack_number(&arr[15..16]).map_err(|_| ProcessorError::ProofInvalid)?;
            let recipient = crate::proof::signals::field_to_address(arr[16]).ok_or(ProcessorError::ProofInvalid)?;
            Ok(PrMergedFact { repository, pr_number, recipient })
        }

        fn process(&self, artifact: &ProofArtifact) -> Result<PrMergedFact, ProcessorError> {
            self.decode(&artifact.signals)
        }
    }

    fn ledger_with(config: &LedgerConfig, clock: Arc<ManualClock>) -> Result<BountyLedger, LedgerError> {
        let mut ledger = BountyLedger::new(
            config,
            ADMIN,
            CUSTODY,
            Arc::new(TrustingIssueProcessor),
            Arc::new(TrustingPrProcessor),
            clock,
        )?;
        ledger.deposit(TOKEN, CREATOR, U256::from(10_000u64))?;
        Ok(ledger)
    }

    fn ledger(clock: Arc<ManualClock>) -> BountyLedger {
        ledger_with(&LedgerConfig::default(), clock).unwrap()
    }

    fn issue_proof(repository: &str, issue: u64, pr: u64) -> ProofArtifact {
        let signals = IssueClosedSignals {
            key_commitment: U256::from(1u64),
            sender: "notifications@github.com".into(),
            repository: repository.into(),
            issue_number: issue,
            pr_number: pr,
        }
        .encode()
        .unwrap();
        ProofArtifact::new(Groth16Proof::default(), signals)
    }

    fn pr_proof(repository: &str, pr: u64) -> ProofArtifact {
        pr_proof_to(repository, pr, RECIPIENT)
    }

    fn pr_proof_to(repository: &str, pr: u64, recipient: Address) -> ProofArtifact {
        let signals = PrMergedSignals {
            key_commitment: U256::from(1u64),
            sender: "notifications@github.com".into(),
            repository: repository.into(),
            pr_number: pr,
            recipient,
        }
        .encode()
        .unwrap();
        ProofArtifact::new(Groth16Proof::default(), signals)
    }

    #[test]
    fn test_create_escrows_funds() {
        let mut ledger = ledger(Arc::new(ManualClock::new(1_000)));
        let id = ledger
            .create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64))
            .unwrap();

        assert_eq!(id, bounty_id("org/repo", 15));
        assert_eq!(ledger.bounty(&id).unwrap().status, BountyStatus::Open);
        assert_eq!(ledger.vault().balance_of(TOKEN, CUSTODY), U256::from(1000u64));
        assert_eq!(ledger.vault().balance_of(TOKEN, CREATOR), U256::from(9000u64));
        assert_eq!(ledger.total_escrowed(TOKEN), U256::from(1000u64));

        let events = ledger.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].bounty_id(), Some(id));
        assert_eq!(events[0].timestamp, 1_000);
    }

    #[test]
    fn test_duplicate_bounty_rejected() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(10u64)).unwrap();
        assert_eq!(
            ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(10u64)),
            Err(LedgerError::AlreadyExists(id))
        );
    }

    #[test]
    fn test_invalid_create_parameters() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        assert!(matches!(
            ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::ZERO),
            Err(LedgerError::InvalidParameter(_))
        ));
        assert!(matches!(
            ledger.create_bounty(CREATOR, "", 15, TOKEN, U256::from(1u64)),
            Err(LedgerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_fee_ceiling_enforced_at_construction() {
        for fee_bps in [1000, 9_999, 10_000, 20_000] {
            let config = LedgerConfig {
                protocol_fee_bps: fee_bps,
                ..LedgerConfig::default()
            };
            assert!(matches!(
                ledger_with(&config, Arc::new(ManualClock::new(0))),
                Err(LedgerError::InvalidParameter(_))
            ));
        }

        let config = LedgerConfig {
            protocol_fee_bps: 999,
            ..LedgerConfig::default()
        };
        let mut ledger = ledger_with(&config, Arc::new(ManualClock::new(0))).unwrap();
        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();
        ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 16)).unwrap();

        let payout = ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 16)).unwrap();
        assert_eq!(payout, U256::from(901u64));
        assert_eq!(ledger.fee_balance(TOKEN), U256::from(99u64));
    }

    #[test]
    fn test_repository_must_fit_merged_layout() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let longest = format!("org/{}", "r".repeat(MAX_REPOSITORY_LEN - 4));
        let too_long = format!("{longest}x");
        assert_eq!(longest.len(), 56);

        assert!(matches!(
            ledger.create_bounty(CREATOR, &too_long, 1, TOKEN, U256::from(10u64)),
            Err(LedgerError::InvalidParameter(_))
        ));
        assert!(ledger.bounty_by_key(&too_long, 1).is_none());

        // The longest accepted name still round-trips through a merged proof
        let id = ledger.create_bounty(CREATOR, &longest, 1, TOKEN, U256::from(10u64)).unwrap();
        ledger.assign_bounty(SOLVER, &issue_proof(&longest, 1, 2)).unwrap();
        ledger.solve_bounty(SOLVER, id, &pr_proof(&longest, 2)).unwrap();
        assert!(ledger.bounty(&id).unwrap().solved());
    }

    #[test]
    fn test_custody_cannot_fund_or_receive() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        ledger.deposit(TOKEN, CUSTODY, U256::from(500u64)).unwrap();
        assert!(matches!(
            ledger.create_bounty(CUSTODY, "org/repo", 1, TOKEN, U256::from(100u64)),
            Err(LedgerError::InvalidParameter(_))
        ));

        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();
        ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 16)).unwrap();
        assert!(matches!(
            ledger.solve_bounty(SOLVER, id, &pr_proof_to("org/repo", 16, CUSTODY)),
            Err(LedgerError::InvalidParameter(_))
        ));
        assert_eq!(ledger.bounty(&id).unwrap().status, BountyStatus::Assigned);
        assert_eq!(ledger.vault().balance_of(TOKEN, CUSTODY), U256::from(1500u64));
    }

    #[test]
    fn test_insufficient_funds_leaves_no_bounty() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let err = ledger
            .create_bounty(SOLVER, "org/repo", 15, TOKEN, U256::from(1u64))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Vault(_)));
        assert!(ledger.bounty_by_key("org/repo", 15).is_none());
        assert!(ledger.take_events().is_empty());
    }

    #[test]
    fn test_assign_then_solve() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();

        assert_eq!(ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 16)).unwrap(), id);
        assert_eq!(ledger.bounty(&id).unwrap().status, BountyStatus::Assigned);
        assert_eq!(ledger.bounty(&id).unwrap().pr_number, Some(16));

        let payout = ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 16)).unwrap();
        assert_eq!(payout, U256::from(990u64));
        assert_eq!(ledger.vault().balance_of(TOKEN, RECIPIENT), U256::from(990u64));
        assert_eq!(ledger.fee_balance(TOKEN), U256::from(10u64));
        assert!(ledger.bounty(&id).unwrap().solved());
    }

    #[test]
    fn test_assign_guards() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let missing = bounty_id("org/repo", 99);
        assert_eq!(
            ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 99, 16)),
            Err(LedgerError::NotFound(missing))
        );

        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();
        ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 16)).unwrap();
        assert_eq!(
            ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 17)),
            Err(LedgerError::AlreadyAssigned(id))
        );

        ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 16)).unwrap();
        assert_eq!(
            ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 16)),
            Err(LedgerError::AlreadyTerminal(id))
        );
    }

    #[test]
    fn test_solve_guards() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();

        // Unassigned
        assert_eq!(
            ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 16)),
            Err(LedgerError::PrNumberMismatch { recorded: None, got: 16 })
        );

        ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 16)).unwrap();
        assert_eq!(
            ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 17)),
            Err(LedgerError::PrNumberMismatch { recorded: Some(16), got: 17 })
        );
        assert!(matches!(
            ledger.solve_bounty(SOLVER, id, &pr_proof("org/other", 16)),
            Err(LedgerError::KeyMismatch { .. })
        ));

        ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 16)).unwrap();
        assert_eq!(
            ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 16)),
            Err(LedgerError::AlreadyTerminal(id))
        );
        assert_eq!(ledger.cancel_bounty(CREATOR, id), Err(LedgerError::AlreadyTerminal(id)));
    }

    #[test]
    fn test_cancel_refunds_once() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();

        assert_eq!(ledger.cancel_bounty(SOLVER, id), Err(LedgerError::NotIssuer));
        ledger.cancel_bounty(CREATOR, id).unwrap();
        assert_eq!(ledger.vault().balance_of(TOKEN, CREATOR), U256::from(10_000u64));
        assert!(ledger.bounty(&id).unwrap().cancelled());

        assert_eq!(ledger.cancel_bounty(CREATOR, id), Err(LedgerError::BountyCancelled(id)));
        assert_eq!(
            ledger.solve_bounty(SOLVER, id, &pr_proof("org/repo", 16)),
            Err(LedgerError::BountyCancelled(id))
        );
        assert_eq!(
            ledger.cancel_bounty(CREATOR, bounty_id("org/repo", 99)),
            Err(LedgerError::NotIssuer)
        );
    }

    #[test]
    fn test_report_penalizes_creator() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut ledger = ledger(clock.clone());
        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();

        assert_eq!(
            ledger.report_bounty(SOLVER, id, &pr_proof("org/repo", 16)),
            Err(LedgerError::NotCancelled)
        );

        ledger.cancel_bounty(CREATOR, id).unwrap();
        let until = ledger.report_bounty(SOLVER, id, &pr_proof("org/repo", 16)).unwrap();
        assert_eq!(until, 1_000 + 86_400);
        assert_eq!(ledger.penalty_until(CREATOR), Some(until));
        assert!(ledger.is_blocked(CREATOR));
        assert_eq!(ledger.bounty(&id).unwrap().status, BountyStatus::Reported);

        assert_eq!(
            ledger.create_bounty(CREATOR, "org/repo", 20, TOKEN, U256::from(10u64)),
            Err(LedgerError::CreatorBlocked { creator: CREATOR, until })
        );
        assert_eq!(
            ledger.report_bounty(SOLVER, id, &pr_proof("org/repo", 16)),
            Err(LedgerError::NotCancelled)
        );

        clock.set(until);
        assert!(!ledger.is_blocked(CREATOR));
        assert!(ledger.create_bounty(CREATOR, "org/repo", 20, TOKEN, U256::from(10u64)).is_ok());
    }

    #[test]
    fn test_report_checks_recorded_pr() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let id = ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();
        ledger.assign_bounty(SOLVER, &issue_proof("org/repo", 15, 16)).unwrap();
        ledger.cancel_bounty(CREATOR, id).unwrap();

        assert_eq!(
            ledger.report_bounty(SOLVER, id, &pr_proof("org/repo", 17)),
            Err(LedgerError::PrNumberMismatch { recorded: Some(16), got: 17 })
        );
        assert!(ledger.report_bounty(SOLVER, id, &pr_proof("org/repo", 16)).is_ok());
    }

    #[test]
    fn test_snapshot_roundtrip_and_hash() {
        let mut ledger = ledger(Arc::new(ManualClock::new(0)));
        let before = ledger.state_hash();
        ledger.create_bounty(CREATOR, "org/repo", 15, TOKEN, U256::from(1000u64)).unwrap();
        assert_ne!(ledger.state_hash(), before);

        let snapshot = ledger.snapshot();
        let decoded = LedgerSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
        assert_eq!(decoded.state_hash(), ledger.state_hash());
    }
}
