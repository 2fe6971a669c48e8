//! # zk-bounty
//!
//! Proof-gated issue bounties: pay whoever proves, with a zero-knowledge
//! proof over a DKIM-signed GitHub notification, that an issue was closed
//! by a pull request and that the pull request was merged.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ZK BOUNTY                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── hash.rs     - Partial SHA-256 state, state hashing      │
//! │  ├── pack.rs     - 7-byte field element packing              │
//! │  └── limbs.rs    - 121-bit RSA limbs                         │
//! │                                                              │
//! │  witness/        - Email → circuit inputs (pure)             │
//! │  ├── padding.rs  - SHA-256 padding to capacity               │
//! │  ├── precompute.rs - Body prefix hash and suffix split       │
//! │  ├── selectors.rs  - Field offsets                           │
//! │  └── builder.rs  - Pipeline and input export                 │
//! │                                                              │
//! │  proof/          - Verify and decode proofs                  │
//! │  ├── signals.rs  - Public signal layouts                     │
//! │  ├── verify.rs   - Verifier interface                        │
//! │  ├── registry.rs - Trusted DKIM keys                         │
//! │  └── processor.rs- Typed facts                               │
//! │                                                              │
//! │  ledger/         - Escrow state machine                      │
//! │  ├── state.rs    - Bounty lifecycle                          │
//! │  ├── governance.rs - Fees and admin                          │
//! │  └── service.rs  - Serialized async access                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `witness/` and `proof/` modules are **pure**:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - Identical input bytes always produce identical witnesses and facts
//!
//! The ledger reads time only through an injected [`ledger::Clock`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod ledger;
pub mod proof;
pub mod witness;

// Re-export commonly used types
pub use config::{LedgerConfig, WitnessConfig};
pub use ledger::{bounty_id, Bounty, BountyId, BountyLedger, BountyStatus, LedgerError, LedgerService};
pub use proof::{
    IssueClosedProcessor, PrMergedProcessor, ProcessorError, ProofArtifact, ProofVerifier, PublicSignals,
};
pub use witness::{FieldSet, RawMessage, WitnessBuilder, WitnessBundle, WitnessError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
