//! Selector Offsets
//!
//! A selector is the 0-based byte index where the circuit starts reading
//! a revealed field. Header selectors index into the raw header; body
//! selectors index into the padded suffix.

use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::error::WitnessError;
use super::precompute::find_subslice;
use crate::proof::signals::ProofKind;

/// Which buffer a selector indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    /// Raw header bytes.
    Header,
    /// Padded body suffix.
    Suffix,
}

/// The fixed set of fields the circuits reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Address inside `<...>` on the `from:` line.
    Sender,
    /// Start of the DKIM body hash (`bh=` tag).
    BodyHash,
    /// Repository name on the `to:` line.
    Repository,
    /// Issue number after `Closed #`.
    IssueNumber,
    /// Closing PR number after `as completed via #`.
    ClosingPrNumber,
    /// PR number after `Merged #`.
    MergedPrNumber,
}

impl Selector {
    /// Buffer this selector indexes.
    pub const fn region(self) -> Region {
        match self {
            Self::Sender | Self::BodyHash | Self::Repository => Region::Header,
            Self::IssueNumber | Self::ClosingPrNumber | Self::MergedPrNumber => Region::Suffix,
        }
    }

    /// Literal text immediately preceding the field.
    pub const fn anchor(self) -> &'static [u8] {
        match self {
            Self::Sender => b"from:",
            Self::BodyHash => b"bh=",
            Self::Repository => b"to:",
            Self::IssueNumber => b"Closed #",
            Self::ClosingPrNumber => b"as completed via #",
            Self::MergedPrNumber => b"Merged #",
        }
    }

    /// Circuit input name for this offset.
    pub const fn input_name(self) -> &'static str {
        match self {
            Self::Sender => "email_from_idx",
            Self::BodyHash => "body_hash_idx",
            Self::Repository => "repo_idx",
            Self::IssueNumber => "issue_idx",
            Self::ClosingPrNumber => "issue_pr_idx",
            Self::MergedPrNumber => "pr_idx",
        }
    }

    /// Locate the field start in `haystack`.
    pub fn locate(self, haystack: &[u8]) -> Option<usize> {
        match self {
            Self::Sender => {
                let value = find_header_field(haystack, self.anchor())?;
                let line = &haystack[value..line_end(haystack, value)];
                line.iter().position(|&b| b == b'<').map(|i| value + i + 1)
            }
            Self::Repository => find_header_field(haystack, self.anchor()),
            _ => find_subslice(haystack, self.anchor()).map(|i| i + self.anchor().len()),
        }
    }

    /// Bytes of the revealed field starting at `offset`.
    ///
    /// Returns `None` when the field is empty or runs off the buffer.
    pub fn extract(self, haystack: &[u8], offset: usize) -> Option<&[u8]> {
        let rest = haystack.get(offset..)?;
        let len = match self {
            Self::Sender => rest.iter().position(|&b| b == b'>')?,
            Self::Repository => rest
                .iter()
                .position(|&b| matches!(b, b' ' | b'<' | b'\r' | b'\n'))
                .unwrap_or(rest.len()),
            Self::BodyHash => rest
                .iter()
                .position(|&b| matches!(b, b';' | b' ' | b'\r' | b'\n'))
                .unwrap_or(rest.len()),
            Self::IssueNumber | Self::ClosingPrNumber | Self::MergedPrNumber => {
                rest.iter().take_while(|b| b.is_ascii_digit()).count()
            }
        };
        if len == 0 {
            return None;
        }
        Some(&rest[..len])
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.input_name())
    }
}

/// Which proof a witness is built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSet {
    /// Issue closed by a PR.
    IssueClosed,
    /// PR merged, paying `recipient`.
    PrMerged {
        /// Payout address bound into the proof.
        recipient: Address,
    },
}

impl FieldSet {
    /// Selectors this field set needs.
    pub fn selectors(&self) -> &'static [Selector] {
        match self {
            Self::IssueClosed => &[
                Selector::Sender,
                Selector::BodyHash,
                Selector::Repository,
                Selector::IssueNumber,
                Selector::ClosingPrNumber,
            ],
            Self::PrMerged { .. } => &[
                Selector::Sender,
                Selector::BodyHash,
                Selector::Repository,
                Selector::MergedPrNumber,
            ],
        }
    }

    /// Proof kind this field set feeds.
    pub fn kind(&self) -> ProofKind {
        match self {
            Self::IssueClosed => ProofKind::IssueClosed,
            Self::PrMerged { .. } => ProofKind::PrMerged,
        }
    }
}

/// Offsets found for a field set. Missing anchors are absent, never defaulted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOffsets(BTreeMap<Selector, usize>);

impl SelectorOffsets {
    /// Locate every selector of `field_set`.
    pub fn locate(field_set: &FieldSet, header: &[u8], suffix: &[u8]) -> Self {
        let offsets = field_set
            .selectors()
            .iter()
            .filter_map(|&selector| {
                let haystack = match selector.region() {
                    Region::Header => header,
                    Region::Suffix => suffix,
                };
                selector.locate(haystack).map(|offset| (selector, offset))
            })
            .collect();
        Self(offsets)
    }

    /// Offset for `selector`, failing closed when it was not found.
    pub fn get(&self, selector: Selector) -> Result<usize, WitnessError> {
        self.0
            .get(&selector)
            .copied()
            .ok_or(WitnessError::SelectorNotFound(selector))
    }

    /// Whether `selector` was found.
    pub fn contains(&self, selector: Selector) -> bool {
        self.0.contains_key(&selector)
    }

    /// Found offsets in selector order.
    pub fn iter(&self) -> impl Iterator<Item = (Selector, usize)> + '_ {
        self.0.iter().map(|(&s, &o)| (s, o))
    }
}

/// Index just past `name` on the first header line starting with it.
fn find_header_field(header: &[u8], name: &[u8]) -> Option<usize> {
    let mut line_start = 0;
    for line in header.split(|&b| b == b'\n') {
        if line.starts_with(name) {
            return Some(line_start + name.len());
        }
        line_start += line.len() + 1;
    }
    None
}

fn line_end(haystack: &[u8], from: usize) -> usize {
    haystack[from..]
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .map_or(haystack.len(), |i| from + i)
}
