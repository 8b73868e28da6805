//! stk-derive
//!
//! Deterministic address allocation for seed-derived accounts.
//!
//! - `derive_with_seed(owner, seed, program)` is pure: same inputs, same address.
//! - `find_first_unused_seed` walks seed indices 0, 1, 2, ... until the derived
//!   address is not already taken.
//! - `attribute_seed` labels an observed address with the seed that produced it,
//!   searching a bounded index range.
//!
//! Pure logic. No IO. Collision resistance is inherited from SHA-256; nothing
//! here verifies that distinct seeds produce distinct addresses.

mod address;
mod seed;

pub use address::{Address, AddressParseError, ADDRESS_LEN};
pub use seed::{attribute_seed, find_first_unused_seed, SeedLabel};

use sha2::{Digest, Sha256};
use std::fmt;

/// Maximum seed length in bytes accepted by the derivation.
pub const MAX_SEED_LEN: usize = 32;

/// Trailing marker reserved for program-derived addresses. A program id that
/// ends with it cannot own seed-derived accounts.
const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// Canonical stake program id.
pub const STAKE_PROGRAM_ID: &str = "Stake11111111111111111111111111111111111111";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// Seed exceeds [`MAX_SEED_LEN`] bytes.
    SeedTooLong { len: usize },
    /// Program id ends with the reserved PDA marker.
    IllegalOwner,
}

impl fmt::Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeriveError::SeedTooLong { len } => {
                write!(f, "seed is {len} bytes, max is {MAX_SEED_LEN}")
            }
            DeriveError::IllegalOwner => write!(f, "program id is reserved for PDAs"),
        }
    }
}

impl std::error::Error for DeriveError {}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive the address for `(owner, seed, program)`.
///
/// `address = SHA-256(owner ‖ seed ‖ program)`.
pub fn derive_with_seed(
    owner: &Address,
    seed: &str,
    program: &Address,
) -> Result<Address, DeriveError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(DeriveError::SeedTooLong { len: seed.len() });
    }
    let program_bytes = program.as_bytes();
    if program_bytes.ends_with(PDA_MARKER) {
        return Err(DeriveError::IllegalOwner);
    }

    let mut hasher = Sha256::new();
    hasher.update(owner.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.update(program_bytes);
    Ok(Address::new(hasher.finalize().into()))
}
