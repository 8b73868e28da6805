//! Seed search and attribution.

use crate::{derive_with_seed, Address, DeriveError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Which seed produced a tracked address, if the client can tell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seed", rename_all = "snake_case")]
pub enum SeedLabel {
    Known(String),
    Unknown,
}

impl SeedLabel {
    pub fn known(seed: impl Into<String>) -> Self {
        SeedLabel::Known(seed.into())
    }

    pub fn is_known(&self) -> bool {
        matches!(self, SeedLabel::Known(_))
    }

    /// Numeric seed index, when the seed is a stringified integer.
    pub fn index(&self) -> Option<u64> {
        match self {
            SeedLabel::Known(s) => s.parse().ok(),
            SeedLabel::Unknown => None,
        }
    }

    /// Total order used by seed-sorted collections:
    /// numeric seeds ascending, then other known seeds lexicographically,
    /// then unknown.
    pub fn canonical_cmp(&self, other: &SeedLabel) -> Ordering {
        fn rank(l: &SeedLabel) -> (u8, u64, &str) {
            match l {
                SeedLabel::Known(s) => match s.parse::<u64>() {
                    Ok(i) => (0, i, ""),
                    Err(_) => (1, 0, s.as_str()),
                },
                SeedLabel::Unknown => (2, 0, ""),
            }
        }
        rank(self).cmp(&rank(other))
    }
}

impl fmt::Display for SeedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedLabel::Known(s) => f.write_str(s),
            SeedLabel::Unknown => f.write_str("N.A."),
        }
    }
}

/// Lowest seed index whose derived address is not in `existing`.
///
/// Unbounded walk over 0, 1, 2, ...; terminates after at most
/// `existing.len() + 1` steps because each taken address can only block one
/// index. The result is only valid against the collection it was computed
/// from: if records can be created concurrently, re-validate before use.
pub fn find_first_unused_seed<'a, I>(
    owner: &Address,
    program: &Address,
    existing: I,
) -> Result<String, DeriveError>
where
    I: IntoIterator<Item = &'a Address>,
{
    let taken: HashSet<&Address> = existing.into_iter().collect();
    let mut index: u64 = 0;
    loop {
        let seed = index.to_string();
        let candidate = derive_with_seed(owner, &seed, program)?;
        if !taken.contains(&candidate) {
            return Ok(seed);
        }
        index += 1;
    }
}

/// Label `address` with the first seed in `0..range` that derives to it.
pub fn attribute_seed(owner: &Address, program: &Address, address: &Address, range: u32) -> SeedLabel {
    (0..range)
        .map(|i| i.to_string())
        .find(|seed| {
            derive_with_seed(owner, seed, program)
                .map(|derived| derived == *address)
                .unwrap_or(false)
        })
        .map(SeedLabel::Known)
        .unwrap_or(SeedLabel::Unknown)
}
