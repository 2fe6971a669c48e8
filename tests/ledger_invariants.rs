//! Ledger conservation under arbitrary call sequences
//!
//! Whatever mix of calls succeeds or fails, custody must hold exactly the
//! escrowed amounts plus unwithdrawn fees, and no call mints or burns.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use proptest::prelude::*;

use zk_bounty::ledger::{BountyStatus, ManualClock};
use zk_bounty::proof::{
    key_hash, AllowlistVerifier, Groth16Proof, IssueClosedSignals, ManagedKeyRegistry, PrMergedSignals,
    ProofArtifact, PublicSignals,
};
use zk_bounty::{bounty_id, BountyLedger, IssueClosedProcessor, LedgerConfig, PrMergedProcessor};

const ADMIN: Address = Address::new([0xAD; 20]);
const CUSTODY: Address = Address::new([0xCC; 20]);
const TOKEN: Address = Address::new([0x70; 20]);
const RECIPIENT: Address = Address::new([0x03; 20]);
const CREATORS: [Address; 2] = [Address::new([0x01; 20]), Address::new([0x02; 20])];
const REPO: &str = "org/repo";
const SENDER: &str = "notifications@github.com";
const FUNDING: u64 = 1_000_000;

#[derive(Clone, Debug)]
enum Op {
    Create { creator: usize, issue: u64, amount: u64 },
    Assign { issue: u64, pr: u64 },
    Solve { issue: u64, pr: u64 },
    Cancel { creator: usize, issue: u64 },
    Report { issue: u64, pr: u64 },
    Withdraw,
    Advance(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..2usize, 0..4u64, 1..50_000u64).prop_map(|(creator, issue, amount)| Op::Create { creator, issue, amount }),
        (0..4u64, 0..3u64).prop_map(|(issue, pr)| Op::Assign { issue, pr }),
        (0..4u64, 0..3u64).prop_map(|(issue, pr)| Op::Solve { issue, pr }),
        (0..2usize, 0..4u64).prop_map(|(creator, issue)| Op::Cancel { creator, issue }),
        (0..4u64, 0..3u64).prop_map(|(issue, pr)| Op::Report { issue, pr }),
        Just(Op::Withdraw),
        (0..200_000u64).prop_map(Op::Advance),
    ]
}

struct World {
    ledger: BountyLedger,
    verifier: Arc<AllowlistVerifier>,
    clock: Arc<ManualClock>,
}

impl World {
    fn new() -> Self {
        let verifier = Arc::new(AllowlistVerifier::new());
        let registry = Arc::new(ManagedKeyRegistry::new(ADMIN));
        registry.add_trusted_key_hash(ADMIN, key_hash(U256::from(1u64))).unwrap();
        let clock = Arc::new(ManualClock::new(0));

        let mut ledger = BountyLedger::new(
            &LedgerConfig::default(),
            ADMIN,
            CUSTODY,
            Arc::new(IssueClosedProcessor::new(verifier.clone(), registry.clone(), SENDER)),
            Arc::new(PrMergedProcessor::new(verifier.clone(), registry, SENDER)),
            clock.clone(),
        )
        .unwrap();
        for creator in CREATORS {
            ledger.deposit(TOKEN, creator, U256::from(FUNDING)).unwrap();
        }
        Self { ledger, verifier, clock }
    }

    fn prove(&self, signals: PublicSignals) -> ProofArtifact {
        let artifact = ProofArtifact::new(Groth16Proof::default(), signals);
        self.verifier.accept(&artifact);
        artifact
    }

    fn issue_proof(&self, issue: u64, pr: u64) -> ProofArtifact {
        self.prove(
            IssueClosedSignals {
                key_commitment: U256::from(1u64),
                sender: SENDER.into(),
                repository: REPO.into(),
                issue_number: issue,
                pr_number: 100 + pr,
            }
            .encode()
            .unwrap(),
        )
    }

    fn merged_proof(&self, pr: u64) -> ProofArtifact {
        self.prove(
            PrMergedSignals {
                key_commitment: U256::from(1u64),
                sender: SENDER.into(),
                repository: REPO.into(),
                pr_number: 100 + pr,
                recipient: RECIPIENT,
            }
            .encode()
            .unwrap(),
        )
    }

    fn apply(&mut self, op: &Op) {
        // Rejections are expected; only the invariants matter here
        let _ = match *op {
            Op::Create { creator, issue, amount } => self
                .ledger
                .create_bounty(CREATORS[creator], REPO, issue, TOKEN, U256::from(amount))
                .map(drop),
            Op::Assign { issue, pr } => {
                let proof = self.issue_proof(issue, pr);
                self.ledger.assign_bounty(RECIPIENT, &proof).map(drop)
            }
            Op::Solve { issue, pr } => {
                let proof = self.merged_proof(pr);
                self.ledger
                    .solve_bounty(RECIPIENT, bounty_id(REPO, issue), &proof)
                    .map(drop)
            }
            Op::Cancel { creator, issue } => self.ledger.cancel_bounty(CREATORS[creator], bounty_id(REPO, issue)),
            Op::Report { issue, pr } => {
                let proof = self.merged_proof(pr);
                self.ledger
                    .report_bounty(RECIPIENT, bounty_id(REPO, issue), &proof)
                    .map(drop)
            }
            Op::Withdraw => self.ledger.withdraw_protocol_fee(ADMIN, TOKEN).map(drop),
            Op::Advance(seconds) => {
                self.clock.advance(seconds);
                Ok(())
            }
        };
    }
}

proptest! {
    #[test]
    fn test_custody_matches_obligations(ops in prop::collection::vec(op(), 1..40)) {
        let mut world = World::new();
        let supply = world.ledger.vault().total_supply(TOKEN);

        for op in &ops {
            world.apply(op);

            let ledger = &world.ledger;
            prop_assert_eq!(
                ledger.vault().balance_of(TOKEN, CUSTODY),
                ledger.total_escrowed(TOKEN) + ledger.fee_balance(TOKEN)
            );
            prop_assert_eq!(ledger.vault().total_supply(TOKEN), supply);
        }
    }

    #[test]
    fn test_terminal_states_are_final(ops in prop::collection::vec(op(), 1..40)) {
        let mut world = World::new();
        let mut terminal = std::collections::BTreeMap::new();

        for op in &ops {
            world.apply(op);

            for bounty in world.ledger.bounties() {
                match terminal.get(&bounty.id) {
                    Some(status) => prop_assert_eq!(bounty.status, *status),
                    None if matches!(bounty.status, BountyStatus::Solved | BountyStatus::Reported) => {
                        terminal.insert(bounty.id, bounty.status);
                    }
                    None => {}
                }
            }
        }
    }
}
