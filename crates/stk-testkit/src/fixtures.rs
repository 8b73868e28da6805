//! Account builders.

use stk_derive::Address;
use stk_ledger::{AccountSnapshot, Authorized, Delegation, Lockup, Meta, StakeState, EPOCH_MAX};

/// Deterministic test address filled with `b`.
pub fn address(b: u8) -> Address {
    Address::new([b; 32])
}

fn meta(owner: Address) -> Meta {
    Meta {
        rent_exempt_reserve: 2_282_880,
        authorized: Authorized {
            staker: owner,
            withdrawer: owner,
        },
        lockup: Lockup::default(),
    }
}

/// Initialized, undelegated stake account with `owner` as both authorities.
pub fn initialized(account: Address, owner: Address, lamports: u64) -> AccountSnapshot {
    AccountSnapshot {
        address: account,
        lamports,
        state: StakeState::Initialized(meta(owner)),
    }
}

/// Stake account delegated to `voter`.
pub fn delegated(account: Address, owner: Address, lamports: u64, voter: Address) -> AccountSnapshot {
    let meta = meta(owner);
    let stake = lamports.saturating_sub(meta.rent_exempt_reserve);
    AccountSnapshot {
        address: account,
        lamports,
        state: StakeState::Delegated {
            meta,
            delegation: Delegation {
                voter,
                stake,
                activation_epoch: 100,
                deactivation_epoch: EPOCH_MAX,
                credits_observed: 0,
            },
        },
    }
}
