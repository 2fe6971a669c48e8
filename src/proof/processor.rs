//! Proof Processors
//!
//! Verify a proof, then decode its public signals into a typed fact.
//! Decoding is pure: the same signals always yield the same fact or the
//! same error.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::pack::{unpack_number, unpack_string, PackError};
use crate::proof::registry::{key_hash, KeyHashRegistry};
use crate::proof::signals::{
    field_to_address, issue_closed, pr_merged, ProofKind, PublicSignals, FLAG_TRUE,
    KEY_COMMITMENT, SELECTOR_FLAG, SENDER, SIGNATURE_FLAG,
};
use crate::proof::verify::{ProofArtifact, ProofVerifier};

/// Errors from proof processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// Verifier rejected the proof, or a circuit flag is not set.
    #[error("invalid proof")]
    ProofInvalid,
    /// Key commitment is not registered as trusted.
    #[error("untrusted signing key {0}")]
    UntrustedSigner(B256),
    /// Proof was made over mail from another sender.
    #[error("sender mismatch: expected {expected}, got {got}")]
    SenderMismatch {
        /// Configured sender.
        expected: String,
        /// Sender exposed by the proof.
        got: String,
    },
    /// Signal array has the wrong length for this proof kind.
    #[error("expected {expected} signals, got {got}")]
    SignalCount {
        /// Layout length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// A packed span does not decode.
    #[error("malformed {field} signal: {reason}")]
    MalformedSignal {
        /// Field name.
        field: &'static str,
        /// Decoding failure.
        reason: String,
    },
}

impl ProcessorError {
    fn malformed(field: &'static str, err: PackError) -> Self {
        Self::MalformedSignal {
            field,
            reason: err.to_string(),
        }
    }
}

/// Facts proven by an issue-closed proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueClosedFact {
    /// Repository, `owner/name`.
    pub repository: String,
    /// Closed issue.
    pub issue_number: u64,
    /// PR that closed it.
    pub pr_number: u64,
}

/// Facts proven by a PR-merged proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrMergedFact {
    /// Repository, `owner/name`.
    pub repository: String,
    /// Merged PR.
    pub pr_number: u64,
    /// Payout address bound into the proof.
    pub recipient: Address,
}

/// A verifier-plus-decoder for one proof kind.
pub trait ProofProcessor: Send + Sync {
    /// Typed facts this processor yields.
    type Fact;

    /// Proof kind handled.
    fn kind(&self) -> ProofKind;

    /// Decode signals without checking the proof.
    fn decode(&self, signals: &PublicSignals) -> Result<Self::Fact, ProcessorError>;

    /// Verify the proof, then decode its signals.
    fn process(&self, artifact: &ProofArtifact) -> Result<Self::Fact, ProcessorError>;
}

/// Checks shared by both processors.
struct SignalGate {
    verifier: Arc<dyn ProofVerifier>,
    registry: Arc<dyn KeyHashRegistry>,
    expected_sender: String,
}

impl SignalGate {
    fn verify(&self, kind: ProofKind, artifact: &ProofArtifact) -> Result<(), ProcessorError> {
        match self.verifier.verify(&artifact.proof, &artifact.signals) {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(?kind, "proof rejected by verifier");
                Err(ProcessorError::ProofInvalid)
            }
            Err(e) => {
                warn!(?kind, error = %e, "proof verification failed");
                Err(ProcessorError::ProofInvalid)
            }
        }
    }

    /// Validate the common prefix and return the signal slice.
    fn check<'a>(&self, kind: ProofKind, signals: &'a PublicSignals) -> Result<&'a [U256], ProcessorError> {
        let arr = signals.as_slice();
        let expected = kind.signal_count();
        if arr.len() != expected {
            return Err(ProcessorError::SignalCount {
                expected,
                got: arr.len(),
            });
        }

        if arr[SIGNATURE_FLAG] != FLAG_TRUE || arr[SELECTOR_FLAG] != FLAG_TRUE {
            return Err(ProcessorError::ProofInvalid);
        }

        let hash = key_hash(arr[KEY_COMMITMENT]);
        if !self.registry.is_trusted(&hash) {
            return Err(ProcessorError::UntrustedSigner(hash));
        }

        let sender = unpack_string(&arr[SENDER]).map_err(|e| ProcessorError::malformed("sender", e))?;
        if sender != self.expected_sender {
            return Err(ProcessorError::SenderMismatch {
                expected: self.expected_sender.clone(),
                got: sender,
            });
        }

        Ok(arr)
    }
}

fn decode_repository(kind: ProofKind, arr: &[U256]) -> Result<String, ProcessorError> {
    let repository = unpack_string(&arr[kind.repository_span()])
        .map_err(|e| ProcessorError::malformed("repository", e))?;
    if repository.is_empty() {
        return Err(ProcessorError::MalformedSignal {
            field: "repository",
            reason: "empty".into(),
        });
    }
    Ok(repository)
}

fn decode_number(field: &'static str, value: U256) -> Result<u64, ProcessorError> {
    unpack_number(&[value]).map_err(|e| ProcessorError::malformed(field, e))
}

/// Processor for issue-closed proofs.
pub struct IssueClosedProcessor {
    gate: SignalGate,
}

impl IssueClosedProcessor {
    /// Create a processor with injected verifier and key registry.
    pub fn new(
        verifier: Arc<dyn ProofVerifier>,
        registry: Arc<dyn KeyHashRegistry>,
        expected_sender: impl Into<String>,
    ) -> Self {
        Self {
            gate: SignalGate {
                verifier,
                registry,
                expected_sender: expected_sender.into(),
            },
        }
    }
}

impl ProofProcessor for IssueClosedProcessor {
    type Fact = IssueClosedFact;

    fn kind(&self) -> ProofKind {
        ProofKind::IssueClosed
    }

    fn decode(&self, signals: &PublicSignals) -> Result<IssueClosedFact, ProcessorError> {
        let arr = self.gate.check(self.kind(), signals)?;
        Ok(IssueClosedFact {
            repository: decode_repository(self.kind(), arr)?,
            issue_number: decode_number("issue number", arr[issue_closed::ISSUE_NUMBER])?,
            pr_number: decode_number("pr number", arr[issue_closed::PR_NUMBER])?,
        })
    }

    fn process(&self, artifact: &ProofArtifact) -> Result<IssueClosedFact, ProcessorError> {
        self.gate.verify(self.kind(), artifact)?;
        self.decode(&artifact.signals)
    }
}

/// Processor for PR-merged proofs.
pub struct PrMergedProcessor {
    gate: SignalGate,
}

impl PrMergedProcessor {
    /// Create a processor with injected verifier and key registry.
    pub fn new(
        verifier: Arc<dyn ProofVerifier>,
        registry: Arc<dyn KeyHashRegistry>,
        expected_sender: impl Into<String>,
    ) -> Self {
        Self {
            gate: SignalGate {
                verifier,
                registry,
                expected_sender: expected_sender.into(),
            },
        }
    }
}

impl ProofProcessor for PrMergedProcessor {
    type Fact = PrMergedFact;

    fn kind(&self) -> ProofKind {
        ProofKind::PrMerged
    }

    fn decode(&self, signals: &PublicSignals) -> Result<PrMergedFact, ProcessorError> {
        let arr = self.gate.check(self.kind(), signals)?;
        let recipient = field_to_address(arr[pr_merged::RECIPIENT]).ok_or(ProcessorError::MalformedSignal {
            field: "recipient",
            reason: "wider than 160 bits".into(),
        })?;
        Ok(PrMergedFact {
            repository: decode_repository(self.kind(), arr)?,
            pr_number: decode_number("pr number", arr[pr_merged::PR_NUMBER])?,
            recipient,
        })
    }

    fn process(&self, artifact: &ProofArtifact) -> Result<PrMergedFact, ProcessorError> {
        self.gate.verify(self.kind(), artifact)?;
        self.decode(&artifact.signals)
    }
}

// =============================================================================
// TESTS
// =============================================================================
