//! Proof Gate
//!
//! Turns externally produced Groth16 proofs into typed facts the ledger
//! can act on:
//! - Fixed public signal layouts for both circuits
//! - Verification through an injected verifier
//! - Trusted DKIM key registry
//! - Issue-closed and PR-merged decoding
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF GATE                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  signals.rs   - Public signal layouts and encoders           │
//! │  verify.rs    - Groth16 artifact and verifier interface      │
//! │  registry.rs  - Trusted key hashes                           │
//! │  processor.rs - Verify then decode into facts                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod processor;
pub mod registry;
pub mod signals;
pub mod verify;

// Re-export key types
pub use processor::{
    IssueClosedFact, IssueClosedProcessor, PrMergedFact, PrMergedProcessor, ProcessorError,
    ProofProcessor,
};
pub use registry::{key_hash, KeyHashRegistry, ManagedKeyRegistry, RegistryError};
pub use signals::{IssueClosedSignals, PrMergedSignals, ProofKind, PublicSignals, SignalError};
pub use verify::{AllowlistVerifier, Groth16Proof, ProofArtifact, ProofVerificationError, ProofVerifier};
