//! Core deterministic primitives.
//!
//! Byte-exact building blocks shared by the witness builder and the
//! proof processors. Nothing here allocates state or reads the clock.

pub mod hash;
pub mod limbs;
pub mod pack;

// Re-export core types
pub use hash::{partial_sha256, StateHash, StateHasher, SHA256_BLOCK_LEN};
pub use limbs::{to_limbs, LIMB_BITS, LIMB_COUNT};
pub use pack::{pack_bytes, unpack_number, unpack_string, PackError, PACK_SIZE};
