//! Verification API
//!
//! Interface to the external Groth16 verifier plus an allow-list
//! verifier for tests and local runs.

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use alloy_primitives::{keccak256, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::proof::signals::PublicSignals;

/// BN254 base field modulus. Curve point coordinates must be below it.
pub const BASE_FIELD_MODULUS: U256 = U256::from_limbs([
    0x3c20_8c16_d87c_fd47,
    0x9781_6a91_6871_ca8d,
    0xb850_45b6_8181_585d,
    0x3064_4e72_e131_a029,
]);

/// Encoded size of a Groth16 proof (8 coordinates).
pub const PROOF_BYTES: usize = 8 * 32;

/// Groth16 proof points, as exchanged with Solidity verifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Groth16Proof {
    /// G1 point A.
    pub a: [U256; 2],
    /// G2 point B.
    pub b: [[U256; 2]; 2],
    /// G1 point C.
    pub c: [U256; 2],
}

impl Groth16Proof {
    fn coordinates(&self) -> [U256; 8] {
        [
            self.a[0], self.a[1],
            self.b[0][0], self.b[0][1], self.b[1][0], self.b[1][1],
            self.c[0], self.c[1],
        ]
    }

    /// Serialize to bytes (coordinates big-endian, a, b, c order).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PROOF_BYTES);
        for coordinate in self.coordinates() {
            bytes.extend_from_slice(&coordinate.to_be_bytes::<32>());
        }
        bytes
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProofVerificationError> {
        if data.len() != PROOF_BYTES {
            return Err(ProofVerificationError::InvalidProofFormat);
        }
        let mut c = data.chunks_exact(32).map(U256::from_be_slice);
        let mut next = || c.next().ok_or(ProofVerificationError::InvalidProofFormat);

        Ok(Self {
            a: [next()?, next()?],
            b: [[next()?, next()?], [next()?, next()?]],
            c: [next()?, next()?],
        })
    }

    /// Whether every coordinate is a canonical base field element.
    pub fn is_canonical(&self) -> bool {
        self.coordinates().iter().all(|v| *v < BASE_FIELD_MODULUS)
    }
}

/// A proof together with the public signals it commits to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    /// Groth16 proof.
    pub proof: Groth16Proof,
    /// Public signals, in circuit order.
    pub signals: PublicSignals,
}

impl ProofArtifact {
    /// Create an artifact.
    pub fn new(proof: Groth16Proof, signals: PublicSignals) -> Self {
        Self { proof, signals }
    }

    /// Binding digest over proof and signals.
    pub fn digest(&self) -> B256 {
        let mut bytes = self.proof.to_bytes();
        bytes.extend_from_slice(&self.signals.to_bytes());
        keccak256(bytes)
    }
}

/// Errors during proof verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofVerificationError {
    /// Proof format is invalid.
    #[error("invalid proof format")]
    InvalidProofFormat,
    /// Verifier backend could not be reached.
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

/// Interface for external Groth16 verification.
///
/// Implementations must be pure: the same proof and signals always
/// produce the same answer.
pub trait ProofVerifier: Send + Sync {
    /// Verify `proof` against `signals`.
    fn verify(&self, proof: &Groth16Proof, signals: &PublicSignals) -> Result<bool, ProofVerificationError>;
}

/// Verifier that accepts exactly the artifacts registered with it.
///
/// Stands in for a circuit-specific verifier where no proving key is
/// available.
#[derive(Debug, Default)]
pub struct AllowlistVerifier {
    accepted: RwLock<BTreeSet<B256>>,
}

impl AllowlistVerifier {
    /// Create an empty verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `artifact` from now on.
    pub fn accept(&self, artifact: &ProofArtifact) {
        self.accepted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(artifact.digest());
    }

    /// Stop accepting `artifact`.
    pub fn revoke(&self, artifact: &ProofArtifact) {
        self.accepted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&artifact.digest());
    }
}

impl ProofVerifier for AllowlistVerifier {
    fn verify(&self, proof: &Groth16Proof, signals: &PublicSignals) -> Result<bool, ProofVerificationError> {
        if !proof.is_canonical() {
            return Err(ProofVerificationError::InvalidProofFormat);
        }
        let digest = ProofArtifact::new(proof.clone(), signals.clone()).digest();
        Ok(self
            .accepted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&digest))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn proof(seed: u64) -> Groth16Proof {
        Groth16Proof {
            a: [U256::from(seed), U256::from(seed + 1)],
            b: [
                [U256::from(seed + 2), U256::from(seed + 3)],
                [U256::from(seed + 4), U256::from(seed + 5)],
            ],
            c: [U256::from(seed + 6), U256::from(seed + 7)],
        }
    }

    fn artifact(seed: u64) -> ProofArtifact {
        let signals = PublicSignals::new(vec![U256::from(1u64), U256::from(seed)]).unwrap();
        ProofArtifact::new(proof(seed), signals)
    }

    #[test]
    fn test_allowlist_verifier() {
        let verifier = AllowlistVerifier::new();
        let good = artifact(1);
        let other = artifact(2);

        assert!(!verifier.verify(&good.proof, &good.signals).unwrap());
        verifier.accept(&good);
        assert!(verifier.verify(&good.proof, &good.signals).unwrap());
        assert!(!verifier.verify(&other.proof, &other.signals).unwrap());

        verifier.revoke(&good);
        assert!(!verifier.verify(&good.proof, &good.signals).unwrap());
    }

    #[test]
    fn test_signals_are_bound() {
        let verifier = AllowlistVerifier::new();
        let good = artifact(1);
        verifier.accept(&good);

        let tampered = PublicSignals::new(vec![U256::from(1u64), U256::from(9u64)]).unwrap();
        assert!(!verifier.verify(&good.proof, &tampered).unwrap());
    }

    #[test]
    fn test_non_canonical_point_rejected() {
        let verifier = AllowlistVerifier::new();
        let mut bad = artifact(1);
        bad.proof.c[1] = BASE_FIELD_MODULUS;
        verifier.accept(&bad);

        assert_eq!(
            verifier.verify(&bad.proof, &bad.signals),
            Err(ProofVerificationError::InvalidProofFormat)
        );
    }

    #[test]
    fn test_proof_bytes_roundtrip() {
        let original = proof(10);
        let bytes = original.to_bytes();
        assert_eq!(bytes.len(), PROOF_BYTES);
        assert_eq!(Groth16Proof::from_bytes(&bytes).unwrap(), original);
        assert_eq!(
            Groth16Proof::from_bytes(&bytes[..100]),
            Err(ProofVerificationError::InvalidProofFormat)
        );
    }
}
