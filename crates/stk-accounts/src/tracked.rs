//! Tracked accounts and their canonical ordering.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stk_config::SortKey;
use stk_derive::{Address, SeedLabel};
use stk_ledger::{AccountSnapshot, InflationReward, StakeState};

/// One stake account in the owner's collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAccount {
    pub address: Address,
    pub seed: SeedLabel,
    pub lamports: u64,
    /// Replaced wholesale on every update.
    pub state: StakeState,
    /// Append-only; survives state replacement.
    pub inflation_rewards: Vec<InflationReward>,
}

impl TrackedAccount {
    pub fn from_snapshot(snapshot: AccountSnapshot, seed: SeedLabel) -> Self {
        Self {
            address: snapshot.address,
            seed,
            lamports: snapshot.lamports,
            state: snapshot.state,
            inflation_rewards: Vec::new(),
        }
    }
}

/// Ordering applied to the collection after every mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Numeric seeds ascending, other seeds lexicographic, unknown last.
    #[default]
    BySeed,
    /// Largest balance first.
    ByBalance,
}

impl SortPolicy {
    pub fn compare(&self, a: &TrackedAccount, b: &TrackedAccount) -> Ordering {
        let primary = match self {
            SortPolicy::BySeed => a.seed.canonical_cmp(&b.seed),
            SortPolicy::ByBalance => b.lamports.cmp(&a.lamports),
        };
        primary.then_with(|| a.address.cmp(&b.address))
    }
}

impl From<SortKey> for SortPolicy {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Seed => SortPolicy::BySeed,
            SortKey::Balance => SortPolicy::ByBalance,
        }
    }
}

/// De-duplicated, always-sorted set of tracked accounts.
///
/// Only the reducer builds modified copies; everything else reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountCollection {
    policy: SortPolicy,
    accounts: Vec<TrackedAccount>,
}

impl AccountCollection {
    pub fn new(policy: SortPolicy) -> Self {
        Self {
            policy,
            accounts: Vec::new(),
        }
    }

    /// Build from arbitrary input. On duplicate addresses the first wins.
    pub fn from_accounts(policy: SortPolicy, accounts: impl IntoIterator<Item = TrackedAccount>) -> Self {
        let mut seen = BTreeSet::new();
        let accounts = accounts
            .into_iter()
            .filter(|a| seen.insert(a.address))
            .collect();
        let mut out = Self { policy, accounts };
        out.resort();
        out
    }

    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    pub fn as_slice(&self) -> &[TrackedAccount] {
        &self.accounts
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedAccount> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, address: &Address) -> Option<&TrackedAccount> {
        self.accounts.iter().find(|a| a.address == *address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.get(address).is_some()
    }

    pub fn addresses(&self) -> BTreeSet<Address> {
        self.accounts.iter().map(|a| a.address).collect()
    }

    pub fn total_lamports(&self) -> u64 {
        self.accounts
            .iter()
            .map(|a| a.lamports)
            .fold(0u64, u64::saturating_add)
    }

    pub(crate) fn position(&self, address: &Address) -> Option<usize> {
        self.accounts.iter().position(|a| a.address == *address)
    }

    pub(crate) fn entry_mut(&mut self, idx: usize) -> &mut TrackedAccount {
        &mut self.accounts[idx]
    }

    pub(crate) fn push(&mut self, account: TrackedAccount) {
        self.accounts.push(account);
    }

    pub(crate) fn remove_at(&mut self, idx: usize) -> TrackedAccount {
        self.accounts.remove(idx)
    }

    pub(crate) fn resort(&mut self) {
        let policy = self.policy;
        self.accounts.sort_by(|a, b| policy.compare(a, b));
    }
}
