//! Witness building errors.

use thiserror::Error;

use super::message::AuthenticationError;
use super::selectors::Selector;
use crate::core::limbs::IntegerTooWide;
use crate::proof::signals::SignalError;

/// Errors from witness preparation. All are fatal for the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WitnessError {
    /// Builder configuration is unusable.
    #[error("invalid witness config: {0}")]
    InvalidConfig(String),
    /// SHA-padded header does not fit the header buffer.
    #[error("header pads to {padded_len} bytes, limit is {max}")]
    HeaderTooLarge {
        /// SHA-padded header length.
        padded_len: usize,
        /// Configured header capacity.
        max: usize,
    },
    /// SHA-padded body does not fit the body buffer.
    #[error("body pads to {padded_len} bytes, limit is {max}")]
    BodyTooLarge {
        /// SHA-padded body length.
        padded_len: usize,
        /// Body buffer size.
        max: usize,
    },
    /// Padded header does not hash to the digest of the raw header.
    #[error("header padding failed SHA-256 self-check")]
    HashSelfCheck,
    /// Boundary marker absent from the body.
    #[error("boundary marker not found in body")]
    BoundaryNotFound,
    /// Remainder after the cutoff does not fit the suffix buffer.
    #[error("remaining body of {remaining} bytes does not fit suffix capacity {max}")]
    RemainingBodyTooLarge {
        /// Bytes after the cutoff.
        remaining: usize,
        /// Configured suffix capacity.
        max: usize,
    },
    /// Suffix is not a whole number of SHA blocks.
    #[error("suffix of {0} bytes is not block aligned")]
    MisalignedSuffix(usize),
    /// Selector anchor missing from the message.
    #[error("selector {0} not found")]
    SelectorNotFound(Selector),
    /// Extracted field is not printable ASCII.
    #[error("selector {0} does not point at ASCII text")]
    MalformedField(Selector),
    /// Signature or key does not fit the limb encoding.
    #[error(transparent)]
    IntegerTooWide(#[from] IntegerTooWide),
    /// Extracted fields do not fit the public signal layout.
    #[error(transparent)]
    Signal(#[from] SignalError),
    /// Authenticator rejected the raw message.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
}
