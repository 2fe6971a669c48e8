//! Authenticated Email Input
//!
//! The builder never parses MIME or checks DKIM itself. An external
//! authenticator hands over the canonicalized header, the body, and the
//! RSA signature with the signer's public modulus.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A DKIM-verified message, as produced by an [`EmailAuthenticator`].
///
/// `signature` and `public_key` are big-endian unsigned integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Canonicalized signed header block.
    pub header: Vec<u8>,
    /// Canonicalized body.
    pub body: Vec<u8>,
    /// RSA signature over the header.
    pub signature: Vec<u8>,
    /// RSA public modulus of the signing key.
    pub public_key: Vec<u8>,
}

impl RawMessage {
    /// Create a message from its parts.
    pub fn new(
        header: impl Into<Vec<u8>>,
        body: impl Into<Vec<u8>>,
        signature: impl Into<Vec<u8>>,
        public_key: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
            signature: signature.into(),
            public_key: public_key.into(),
        }
    }
}

/// Errors from the email authentication seam.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    /// Input is not a parseable RFC 5322 message.
    #[error("malformed message: {0}")]
    Malformed(String),
    /// No DKIM-Signature header present.
    #[error("message carries no DKIM signature")]
    MissingSignature,
    /// Signature did not verify against the published key.
    #[error("DKIM signature verification failed")]
    InvalidSignature,
    /// Signer's key could not be resolved.
    #[error("public key unavailable for {0}")]
    KeyUnavailable(String),
}

/// External DKIM verifier.
///
/// Implementations canonicalize the message and check the signature.
/// Anything returned here is trusted by the witness builder.
pub trait EmailAuthenticator: Send + Sync {
    /// Verify `raw` and split it into its signed parts.
    fn authenticate(&self, raw: &[u8]) -> Result<RawMessage, AuthenticationError>;
}
