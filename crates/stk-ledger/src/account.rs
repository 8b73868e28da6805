//! Parsed stake-account contents.

use serde::{Deserialize, Serialize};
use stk_derive::Address;

/// Sentinel epoch meaning "not deactivating".
pub const EPOCH_MAX: u64 = u64::MAX;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorized {
    pub staker: Address,
    pub withdrawer: Address,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockup {
    pub unix_timestamp: i64,
    pub epoch: u64,
    pub custodian: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub rent_exempt_reserve: u64,
    pub authorized: Authorized,
    pub lockup: Lockup,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub voter: Address,
    pub stake: u64,
    pub activation_epoch: u64,
    pub deactivation_epoch: u64,
    pub credits_observed: u64,
}

impl Delegation {
    pub fn is_deactivating(&self) -> bool {
        self.deactivation_epoch != EPOCH_MAX
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StakeState {
    Uninitialized,
    Initialized(Meta),
    Delegated { meta: Meta, delegation: Delegation },
    RewardsPool,
}

impl StakeState {
    pub fn meta(&self) -> Option<&Meta> {
        match self {
            StakeState::Initialized(meta) | StakeState::Delegated { meta, .. } => Some(meta),
            _ => None,
        }
    }

    pub fn delegation(&self) -> Option<&Delegation> {
        match self {
            StakeState::Delegated { delegation, .. } => Some(delegation),
            _ => None,
        }
    }

    pub fn staker(&self) -> Option<&Address> {
        self.meta().map(|m| &m.authorized.staker)
    }

    pub fn withdrawer(&self) -> Option<&Address> {
        self.meta().map(|m| &m.authorized.withdrawer)
    }

    /// `true` if `owner` holds either authority over this account.
    pub fn is_controlled_by(&self, owner: &Address) -> bool {
        self.staker() == Some(owner) || self.withdrawer() == Some(owner)
    }
}

/// Current contents of one account as reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub lamports: u64,
    pub state: StakeState,
}

/// One epoch's inflation reward credited to a stake account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationReward {
    pub epoch: u64,
    pub amount: u64,
    pub post_balance: u64,
    pub effective_slot: u64,
}
