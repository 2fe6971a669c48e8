//! Proof-Gated Bounty Ledger
//!
//! Escrow state machine driven by verified proofs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BOUNTY LEDGER                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  bounty.rs     - Bounty record, key derivation, status       │
//! │  state.rs      - Lifecycle operations, queries, snapshots    │
//! │  governance.rs - Admin parameters and fee withdrawal         │
//! │  vault.rs      - Token balances                              │
//! │  clock.rs      - Time source                                 │
//! │  events.rs     - Emitted events                              │
//! │  service.rs    - Serialized async access                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bounty;
pub mod clock;
pub mod error;
pub mod events;
pub mod governance;
pub mod service;
pub mod state;
pub mod vault;

// Re-export key types
pub use bounty::{bounty_id, Bounty, BountyId, BountyStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::LedgerError;
pub use events::{LedgerEvent, LedgerEventData};
pub use governance::{GovernanceParams, FEE_DENOMINATOR};
pub use service::LedgerService;
pub use state::{BountyLedger, IssueProcessorRef, LedgerSnapshot, PrProcessorRef};
pub use vault::{TokenVault, VaultError};
