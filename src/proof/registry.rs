//! DKIM Key Registry
//!
//! Proofs expose a commitment to the signer's public key. Only proofs whose
//! key hash has been registered by the admin are trusted.

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use alloy_primitives::{keccak256, Address, B256, U256};
use thiserror::Error;
use tracing::info;

/// Hash of a public key commitment: `keccak256(be32(commitment))`.
pub fn key_hash(commitment: U256) -> B256 {
    keccak256(commitment.to_be_bytes::<32>())
}

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Caller is not the registry admin.
    #[error("caller {0} is not the registry admin")]
    Unauthorized(Address),
}

/// Read side of the registry, as seen by proof processors.
pub trait KeyHashRegistry: Send + Sync {
    /// Whether `key_hash` belongs to a trusted signer.
    fn is_trusted(&self, key_hash: &B256) -> bool;
}

/// Admin-managed set of trusted key hashes.
#[derive(Debug)]
pub struct ManagedKeyRegistry {
    admin: Address,
    trusted: RwLock<BTreeSet<B256>>,
}

impl ManagedKeyRegistry {
    /// Create an empty registry owned by `admin`.
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            trusted: RwLock::new(BTreeSet::new()),
        }
    }

    /// Registry admin.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Trust `key_hash`. Returns false if it was already trusted.
    pub fn add_trusted_key_hash(&self, caller: Address, key_hash: B256) -> Result<bool, RegistryError> {
        self.ensure_admin(caller)?;
        let added = self
            .trusted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key_hash);
        if added {
            info!(key_hash = %key_hash, "trusted key hash added");
        }
        Ok(added)
    }

    /// Stop trusting `key_hash`. Returns false if it was not trusted.
    pub fn remove_trusted_key_hash(&self, caller: Address, key_hash: B256) -> Result<bool, RegistryError> {
        self.ensure_admin(caller)?;
        let removed = self
            .trusted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key_hash);
        if removed {
            info!(key_hash = %key_hash, "trusted key hash removed");
        }
        Ok(removed)
    }

    fn ensure_admin(&self, caller: Address) -> Result<(), RegistryError> {
        if caller != self.admin {
            return Err(RegistryError::Unauthorized(caller));
        }
        Ok(())
    }
}

impl KeyHashRegistry for ManagedKeyRegistry {
    fn is_trusted(&self, key_hash: &B256) -> bool {
        self.trusted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key_hash)
    }
}
