//! Runtime Configuration
//!
//! Environment-driven settings with defaults matching the GitHub
//! notification circuits. Unparseable values fall back to the default.

use std::str::FromStr;

use tracing::warn;

use crate::core::SHA256_BLOCK_LEN;
use crate::witness::WitnessError;

/// Protocol fees at or above this many basis points are rejected.
pub const MAX_PROTOCOL_FEE_BPS: u64 = 1000;

/// Witness buffer sizes and the body boundary marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessConfig {
    /// Header buffer capacity in bytes.
    pub max_header_len: usize,
    /// Minimum body buffer capacity in bytes.
    pub body_capacity: usize,
    /// Suffix buffer capacity in bytes.
    pub suffix_capacity: usize,
    /// Text marking where the circuit starts reading the body.
    pub boundary_marker: String,
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            max_header_len: 1536,
            body_capacity: 6272,
            suffix_capacity: 6272,
            boundary_marker: "----==_mimepart_".to_string(),
        }
    }
}

impl WitnessConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_header_len: env_or("ZKB_MAX_HEADER_LEN", defaults.max_header_len),
            body_capacity: env_or("ZKB_BODY_CAPACITY", defaults.body_capacity),
            suffix_capacity: env_or("ZKB_SUFFIX_CAPACITY", defaults.suffix_capacity),
            boundary_marker: std::env::var("ZKB_BOUNDARY_MARKER")
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(defaults.boundary_marker),
        }
    }

    /// Check that every buffer is a positive multiple of the SHA block size.
    pub fn validate(&self) -> Result<(), WitnessError> {
        for (name, value) in [
            ("max_header_len", self.max_header_len),
            ("body_capacity", self.body_capacity),
            ("suffix_capacity", self.suffix_capacity),
        ] {
            if value == 0 || value % SHA256_BLOCK_LEN != 0 {
                return Err(WitnessError::InvalidConfig(format!(
                    "{name} = {value} is not a positive multiple of {SHA256_BLOCK_LEN}"
                )));
            }
        }
        if self.boundary_marker.is_empty() {
            return Err(WitnessError::InvalidConfig("empty boundary marker".into()));
        }
        Ok(())
    }
}

/// Ledger governance defaults and the trusted notification sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Protocol fee in basis points (100 = 1%).
    pub protocol_fee_bps: u64,
    /// Creator penalty after a successful report, in seconds.
    pub penalty_period_secs: u64,
    /// Sender address every proof must expose.
    pub expected_sender: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            protocol_fee_bps: 100,
            penalty_period_secs: 86_400,
            expected_sender: "notifications@github.com".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut protocol_fee_bps = env_or("ZKB_PROTOCOL_FEE_BPS", defaults.protocol_fee_bps);
        if protocol_fee_bps >= MAX_PROTOCOL_FEE_BPS {
            warn!(protocol_fee_bps, "protocol fee too high, using default");
            protocol_fee_bps = defaults.protocol_fee_bps;
        }

        Self {
            protocol_fee_bps,
            penalty_period_secs: env_or("ZKB_PENALTY_PERIOD_SECS", defaults.penalty_period_secs),
            expected_sender: std::env::var("ZKB_EXPECTED_SENDER")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.expected_sender),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid config value, using default");
            default
        }),
        Err(_) => default,
    }
}
