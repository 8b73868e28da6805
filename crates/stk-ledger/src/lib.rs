//! stk-ledger
//!
//! Boundary to the remote ledger. This crate owns the account data model, the
//! change-event shape, and the subscription capability; it has no transport.
//! Concrete clients implement [`LedgerClient`] elsewhere.

mod account;
mod client;
mod subscription;

pub use account::*;
pub use client::{LedgerClient, LedgerError};
pub use subscription::{subscription_channel, Subscription, SubscriptionId, SubscriptionSink};

pub use stk_derive::Address;

/// A change reported for one address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The address no longer resolves (account closed).
    Removed { address: Address },
    /// Full replacement of the account's current contents.
    Upserted(AccountSnapshot),
}

impl ChangeEvent {
    pub fn address(&self) -> &Address {
        match self {
            ChangeEvent::Removed { address } => address,
            ChangeEvent::Upserted(snap) => &snap.address,
        }
    }
}
