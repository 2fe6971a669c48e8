//! Witness Builder
//!
//! Turns an authenticated email into the fixed-size inputs of the
//! issue-closed and PR-merged circuits.
//!
//! ```text
//! header ── sha256_pad ── self-check ──────────────┐
//! body ──── sha256_pad ── split at boundary ───────┼── WitnessBundle
//!                          ├─ prefix → SHA state ──┤
//!                          └─ suffix → selectors ──┘
//! ```

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::error::WitnessError;
use super::message::{EmailAuthenticator, RawMessage};
use super::padding::{sha256_pad, PaddedBlock};
use super::precompute::PrecomputeSplit;
use super::selectors::{FieldSet, Region, Selector, SelectorOffsets};
use crate::config::WitnessConfig;
use crate::core::hash::{hash_bytes, partial_sha256, StateHash};
use crate::core::limbs::{to_limbs, LIMB_COUNT};
use crate::proof::signals::{address_to_field, IssueClosedSignals, PrMergedSignals, PublicSignals};

/// Everything the prover needs for one message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessBundle {
    /// Which circuit this witness targets.
    pub field_set: FieldSet,
    /// Padded header, zero-filled to the header capacity.
    pub header: PaddedBlock,
    /// SHA-256 state after the precomputed body prefix.
    pub precomputed_sha: StateHash,
    /// Body bytes from the cutoff, zero-filled to the suffix capacity.
    pub suffix: Vec<u8>,
    /// Meaningful bytes in `suffix`.
    pub suffix_len: usize,
    /// RSA signature limbs.
    pub signature: [u128; LIMB_COUNT],
    /// RSA modulus limbs.
    pub public_key: [u128; LIMB_COUNT],
    /// Selector offsets found in the message.
    pub offsets: SelectorOffsets,
}

impl WitnessBundle {
    /// Offset for `selector`, failing closed when it is absent.
    pub fn selector(&self, selector: Selector) -> Result<usize, WitnessError> {
        self.offsets.get(selector)
    }

    /// Circuit input JSON, numbers as decimal strings.
    pub fn circuit_inputs(&self) -> Result<Value, WitnessError> {
        let mut inputs = json!({
            "in_padded": decimal_bytes(self.header.bytes()),
            "pubkey": decimal_limbs(&self.public_key),
            "signature": decimal_limbs(&self.signature),
            "in_len_padded_bytes": self.header.padded_len().to_string(),
            "precomputed_sha": decimal_bytes(&self.precomputed_sha),
            "in_body_padded": decimal_bytes(&self.suffix),
            "in_body_len_padded_bytes": self.suffix_len.to_string(),
        });

        if let Some(map) = inputs.as_object_mut() {
            for &selector in self.field_set.selectors() {
                map.insert(
                    selector.input_name().to_string(),
                    Value::String(self.selector(selector)?.to_string()),
                );
            }
            if let FieldSet::PrMerged { recipient } = self.field_set {
                map.insert(
                    "recipient".to_string(),
                    Value::String(address_to_field(&recipient).to_string()),
                );
            }
        }

        Ok(inputs)
    }

    /// Public signals a correct proof over this witness must expose.
    pub fn expected_signals(&self, key_commitment: U256) -> Result<PublicSignals, WitnessError> {
        let sender = self.read_text(Selector::Sender)?;
        let repository = self.read_text(Selector::Repository)?;

        let signals = match self.field_set {
            FieldSet::IssueClosed => IssueClosedSignals {
                key_commitment,
                sender,
                repository,
                issue_number: self.read_number(Selector::IssueNumber)?,
                pr_number: self.read_number(Selector::ClosingPrNumber)?,
            }
            .encode()?,
            FieldSet::PrMerged { recipient } => PrMergedSignals {
                key_commitment,
                sender,
                repository,
                pr_number: self.read_number(Selector::MergedPrNumber)?,
                recipient,
            }
            .encode()?,
        };
        Ok(signals)
    }

    fn read_field(&self, selector: Selector) -> Result<&[u8], WitnessError> {
        let haystack = match selector.region() {
            Region::Header => self.header.data(),
            Region::Suffix => &self.suffix[..self.suffix_len],
        };
        let offset = self.selector(selector)?;
        selector
            .extract(haystack, offset)
            .ok_or(WitnessError::MalformedField(selector))
    }

    fn read_text(&self, selector: Selector) -> Result<String, WitnessError> {
        let bytes = self.read_field(selector)?;
        if !bytes.iter().all(u8::is_ascii_graphic) {
            return Err(WitnessError::MalformedField(selector));
        }
        Ok(bytes.iter().copied().map(char::from).collect())
    }

    fn read_number(&self, selector: Selector) -> Result<u64, WitnessError> {
        self.read_text(selector)?
            .parse()
            .map_err(|_| WitnessError::MalformedField(selector))
    }
}

/// Stateless witness builder. Safe to share across threads.
#[derive(Clone, Debug, Default)]
pub struct WitnessBuilder {
    config: WitnessConfig,
}

impl WitnessBuilder {
    /// Create a builder with the given buffer configuration.
    pub fn new(config: WitnessConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &WitnessConfig {
        &self.config
    }

    /// Authenticate `raw` and build its witness.
    pub fn build_from_raw(
        &self,
        authenticator: &dyn EmailAuthenticator,
        raw: &[u8],
        field_set: FieldSet,
    ) -> Result<WitnessBundle, WitnessError> {
        let message = authenticator.authenticate(raw).map_err(|e| {
            warn!(error = %e, "email authentication failed");
            e
        })?;
        self.build(&message, field_set)
    }

    /// Build the witness for an authenticated message.
    pub fn build(&self, message: &RawMessage, field_set: FieldSet) -> Result<WitnessBundle, WitnessError> {
        let config = &self.config;
        config.validate()?;

        let header = sha256_pad(&message.header, config.max_header_len).map_err(|e| {
            WitnessError::HeaderTooLarge {
                padded_len: e.padded_len,
                max: e.capacity,
            }
        })?;

        let body_capacity = config
            .body_capacity
            .max((message.body.len() + 128) / 64 * 64);
        let body = sha256_pad(&message.body, body_capacity).map_err(|e| WitnessError::BodyTooLarge {
            padded_len: e.padded_len,
            max: e.capacity,
        })?;

        let header_state =
            partial_sha256(header.padded_message()).map_err(|_| WitnessError::HashSelfCheck)?;
        if header_state != hash_bytes(&message.header) {
            return Err(WitnessError::HashSelfCheck);
        }

        let split = PrecomputeSplit::split(&body, config.boundary_marker.as_bytes(), config.suffix_capacity)?;

        let signature = to_limbs(&message.signature)?;
        let public_key = to_limbs(&message.public_key)?;

        let offsets = SelectorOffsets::locate(
            &field_set,
            header.data(),
            &split.suffix[..split.remaining_len],
        );
        for &selector in field_set.selectors() {
            if !offsets.contains(selector) {
                debug!(%selector, "selector anchor not found");
            }
        }

        debug!(
            header_len = header.padded_len(),
            cutoff = split.cutoff,
            suffix_len = split.remaining_len,
            "witness built"
        );

        Ok(WitnessBundle {
            field_set,
            header,
            precomputed_sha: split.prefix_state,
            suffix: split.suffix,
            suffix_len: split.remaining_len,
            signature,
            public_key,
            offsets,
        })
    }
}

fn decimal_bytes(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(u8::to_string).collect()
}

fn decimal_limbs(limbs: &[u128; LIMB_COUNT]) -> Vec<String> {
    limbs.iter().map(u128::to_string).collect()
}
