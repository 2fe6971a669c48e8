//! Email Witness Preparation
//!
//! Byte-exact transformation of a DKIM-verified notification into the
//! inputs the email circuits expect.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WITNESS PIPELINE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  message.rs    - Authenticated message + DKIM seam           │
//! │  padding.rs    - SHA-256 padding to fixed capacity           │
//! │  precompute.rs - Body prefix hashing and suffix split        │
//! │  selectors.rs  - Field offsets for the revealed values       │
//! │  builder.rs    - Pipeline and circuit input export           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod builder;
pub mod error;
pub mod message;
pub mod padding;
pub mod precompute;
pub mod selectors;

// Re-export key types
pub use builder::{WitnessBuilder, WitnessBundle};
pub use error::WitnessError;
pub use message::{AuthenticationError, EmailAuthenticator, RawMessage};
pub use padding::{sha256_pad, PaddedBlock};
pub use precompute::PrecomputeSplit;
pub use selectors::{FieldSet, Selector, SelectorOffsets};
