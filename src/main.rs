//! zk-bounty demo
//!
//! Walks one bounty through its lifecycle: builds witnesses for a
//! synthetic GitHub notification pair, stands in for the external prover
//! with an allow-list verifier, and drives the ledger to payout.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use zk_bounty::{
    core::hash::hash_bytes,
    ledger::{BountyLedger, LedgerEventData, LedgerService, SystemClock},
    proof::{
        key_hash, signals::SNARK_SCALAR_FIELD, AllowlistVerifier, Groth16Proof, IssueClosedProcessor,
        ManagedKeyRegistry, PrMergedProcessor, ProofArtifact,
    },
    FieldSet, LedgerConfig, RawMessage, WitnessBuilder, WitnessConfig, VERSION,
};

const ADMIN: Address = Address::new([0xAD; 20]);
const CUSTODY: Address = Address::new([0xCC; 20]);
const TOKEN: Address = Address::new([0x70; 20]);
const CREATOR: Address = Address::new([0x01; 20]);
const SOLVER: Address = Address::new([0x02; 20]);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("zk-bounty v{}", VERSION);

    let witness_config = WitnessConfig::from_env();
    let ledger_config = LedgerConfig::from_env();
    info!(
        header = witness_config.max_header_len,
        suffix = witness_config.suffix_capacity,
        fee_bps = ledger_config.protocol_fee_bps,
        "configuration loaded"
    );

    demo_bounty(witness_config, ledger_config).await
}

/// Demo function running one bounty from creation to payout.
async fn demo_bounty(witness_config: WitnessConfig, ledger_config: LedgerConfig) -> anyhow::Result<()> {
    info!("=== Building Witnesses ===");

    let builder = WitnessBuilder::new(witness_config);
    let public_key = vec![0xC1u8; 256];
    let key_commitment = U256::from_be_bytes(hash_bytes(&public_key)) % SNARK_SCALAR_FIELD;

    let issue_mail = notification("Closed #15 as completed via #16.", &public_key);
    let issue_witness = builder.build(&issue_mail, FieldSet::IssueClosed)?;
    let issue_inputs = issue_witness.circuit_inputs()?;
    info!(
        inputs = issue_inputs.as_object().map_or(0, |m| m.len()),
        suffix_len = issue_witness.suffix_len,
        "issue-closed witness ready"
    );

    let recipient = Address::new([0x03; 20]);
    let merged_mail = notification("Merged #16 into main.", &public_key);
    let merged_witness = builder.build(&merged_mail, FieldSet::PrMerged { recipient })?;
    info!(suffix_len = merged_witness.suffix_len, "pr-merged witness ready");

    // The allow-list verifier stands in for the external prover
    let verifier = Arc::new(AllowlistVerifier::new());
    let issue_proof = ProofArtifact::new(Groth16Proof::default(), issue_witness.expected_signals(key_commitment)?);
    let merged_proof = ProofArtifact::new(Groth16Proof::default(), merged_witness.expected_signals(key_commitment)?);
    verifier.accept(&issue_proof);
    verifier.accept(&merged_proof);

    let registry = Arc::new(ManagedKeyRegistry::new(ADMIN));
    registry.add_trusted_key_hash(ADMIN, key_hash(key_commitment))?;

    info!("=== Running Bounty ===");

    let sender = ledger_config.expected_sender.clone();
    let mut ledger = BountyLedger::new(
        &ledger_config,
        ADMIN,
        CUSTODY,
        Arc::new(IssueClosedProcessor::new(verifier.clone(), registry.clone(), sender.clone())),
        Arc::new(PrMergedProcessor::new(verifier, registry, sender)),
        Arc::new(SystemClock),
    )?;
    ledger.deposit(TOKEN, CREATOR, U256::from(1000u64))?;
    let service = LedgerService::new(ledger);

    let id = service
        .create_bounty(CREATOR, "jstinhw/zk-grant-testing", 15, TOKEN, U256::from(1000u64))
        .await?;
    service.assign_bounty(SOLVER, &issue_proof).await?;
    let payout = service.solve_bounty(SOLVER, id, &merged_proof).await?;

    for event in service.take_events().await {
        match event.data {
            LedgerEventData::BountyAssigned { pr_number, assignee, .. } => {
                info!("Assigned PR #{} to {}", pr_number, assignee);
            }
            LedgerEventData::BountySolved { recipient, payout, fee, .. } => {
                info!("Paid {} to {} (fee {})", payout, recipient, fee);
            }
            _ => {}
        }
    }

    info!("=== Results ===");
    let (balance, fees) = service
        .with_ledger(|l| (l.vault().balance_of(TOKEN, recipient), l.fee_balance(TOKEN)))
        .await;
    info!("Payout: {}", payout);
    info!("Recipient balance: {}", balance);
    info!("Accrued fees: {}", fees);
    info!("State Hash: {}", hex::encode(service.state_hash().await));

    Ok(())
}

/// Synthetic GitHub notification with the given plain-text line.
fn notification(text: &str, public_key: &[u8]) -> RawMessage {
    let header = b"to:jstinhw/zk-grant-testing <zk-grant-testing@noreply.github.com>\r\n\
from:jhw <notifications@github.com>\r\n\
subject:Re: [jstinhw/zk-grant-testing] Add witness builder (Issue #15)\r\n\
dkim-signature:v=1; a=rsa-sha256; c=relaxed/relaxed; d=github.com; s=pf2023; bh=Tz2bN1hY0Hn5u3Ij=; b="
        .to_vec();

    let mut body = b"You are receiving this because you are subscribed to this thread.\r\n\r\n".to_vec();
    body.extend_from_slice(b"----==_mimepart_6630ab_1f\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(text.as_bytes());
    body.extend_from_slice(b"\r\n\r\n----==_mimepart_6630ab_1f--\r\n");

    RawMessage::new(header, body, vec![0x5Au8; 256], public_key.to_vec())
}
