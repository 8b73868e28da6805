//! In-memory [`LedgerClient`].
//!
//! Accounts live in a `BTreeMap`. Changes reach consumers only through
//! [`MemoryLedger::publish`], [`MemoryLedger::close_account`] and
//! [`MemoryLedger::deliver`], each taking a [`Delivery`] that picks the
//! channel(s) that observe it. `put_account` changes state silently, which is
//! how a test models a notification that both channels dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use stk_derive::Address;
use stk_ledger::{
    subscription_channel, AccountSnapshot, ChangeEvent, LedgerClient, LedgerError, Subscription,
    SubscriptionId, SubscriptionSink,
};
use tracing::debug;

/// Which subscription channel(s) observe a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Both,
    OwnerOnly,
    AddressOnly,
    Dropped,
}

impl Delivery {
    fn owner(self) -> bool {
        matches!(self, Delivery::Both | Delivery::OwnerOnly)
    }

    fn address(self) -> bool {
        matches!(self, Delivery::Both | Delivery::AddressOnly)
    }
}

#[derive(Default)]
struct Inner {
    accounts: BTreeMap<Address, AccountSnapshot>,
    owner_subs: Vec<(Address, SubscriptionSink)>,
    address_subs: Vec<(Address, SubscriptionSink)>,
    hidden: HashMap<Address, u32>,
    fetches: HashMap<Address, u32>,
    scan_failures: u32,
    scans: u32,
    refuse_owner_subscriptions: bool,
    next_id: u64,
}

impl Inner {
    fn prune(&mut self) {
        self.owner_subs.retain(|(_, s)| !s.is_released());
        self.address_subs.retain(|(_, s)| !s.is_released());
    }

    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    fn route(&mut self, event: ChangeEvent, staker: Option<Address>, delivery: Delivery) {
        self.prune();
        if delivery.owner() {
            if let Some(staker) = staker {
                for (owner, sink) in &self.owner_subs {
                    if *owner == staker {
                        sink.deliver(event.clone());
                    }
                }
            }
        }
        if delivery.address() {
            for (addr, sink) in &self.address_subs {
                if addr == event.address() {
                    sink.deliver(event.clone());
                }
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an account without notifying anyone.
    pub fn put_account(&self, snapshot: AccountSnapshot) {
        self.inner().accounts.insert(snapshot.address, snapshot);
    }

    /// Store an account and notify the chosen channel(s).
    pub fn publish(&self, snapshot: AccountSnapshot, delivery: Delivery) {
        let mut inner = self.inner();
        let staker = snapshot.state.staker().copied();
        inner.accounts.insert(snapshot.address, snapshot.clone());
        inner.route(ChangeEvent::Upserted(snapshot), staker, delivery);
    }

    /// Close an account and notify the chosen channel(s).
    pub fn close_account(&self, address: &Address, delivery: Delivery) {
        let mut inner = self.inner();
        let staker = inner
            .accounts
            .remove(address)
            .and_then(|a| a.state.staker().copied());
        inner.route(ChangeEvent::Removed { address: *address }, staker, delivery);
    }

    /// Deliver an arbitrary event without touching stored state (replays).
    pub fn deliver(&self, event: ChangeEvent, owner: Option<Address>, delivery: Delivery) {
        self.inner().route(event, owner, delivery);
    }

    /// The next `misses` fetches of `address` report it as absent.
    pub fn hide_for_fetches(&self, address: &Address, misses: u32) {
        self.inner().hidden.insert(*address, misses);
    }

    /// The next `n` owner scans fail with a transport error.
    pub fn fail_scans(&self, n: u32) {
        self.inner().scan_failures = n;
    }

    /// Make `subscribe_by_owner` fail.
    pub fn refuse_owner_subscriptions(&self, refuse: bool) {
        self.inner().refuse_owner_subscriptions = refuse;
    }

    pub fn fetch_count(&self, address: &Address) -> u32 {
        self.inner().fetches.get(address).copied().unwrap_or(0)
    }

    pub fn scan_count(&self) -> u32 {
        self.inner().scans
    }

    /// Owners with an unreleased owner-filtered subscription.
    pub fn live_owner_subscriptions(&self) -> Vec<Address> {
        let mut inner = self.inner();
        inner.prune();
        inner.owner_subs.iter().map(|(a, _)| *a).collect()
    }

    /// Addresses with an unreleased exact-address subscription, sorted.
    pub fn live_address_subscriptions(&self) -> Vec<Address> {
        let mut inner = self.inner();
        inner.prune();
        let mut out: Vec<Address> = inner.address_subs.iter().map(|(a, _)| *a).collect();
        out.sort();
        out
    }
}

#[async_trait::async_trait]
impl LedgerClient for MemoryLedger {
    async fn scan_accounts_for_owner(
        &self,
        owner: &Address,
    ) -> Result<Vec<AccountSnapshot>, LedgerError> {
        let mut inner = self.inner();
        inner.scans += 1;
        if inner.scan_failures > 0 {
            inner.scan_failures -= 1;
            return Err(LedgerError::Transport("scan refused".to_string()));
        }
        Ok(inner
            .accounts
            .values()
            .filter(|a| a.state.is_controlled_by(owner))
            .cloned()
            .collect())
    }

    async fn fetch_account(
        &self,
        address: &Address,
    ) -> Result<Option<AccountSnapshot>, LedgerError> {
        let mut inner = self.inner();
        *inner.fetches.entry(*address).or_default() += 1;
        if let Some(misses) = inner.hidden.get_mut(address) {
            if *misses > 0 {
                *misses -= 1;
                return Ok(None);
            }
        }
        Ok(inner.accounts.get(address).cloned())
    }

    fn subscribe_by_owner(&self, owner: &Address) -> Result<Subscription, LedgerError> {
        let mut inner = self.inner();
        if inner.refuse_owner_subscriptions {
            return Err(LedgerError::Subscription("owner filter refused".to_string()));
        }
        let id = inner.next_id();
        let (sink, sub) = subscription_channel(id);
        inner.owner_subs.push((*owner, sink));
        debug!(owner = %owner, id = id.0, "memory ledger: owner subscription opened");
        Ok(sub)
    }

    fn subscribe_by_address(&self, address: &Address) -> Result<Subscription, LedgerError> {
        let mut inner = self.inner();
        let id = inner.next_id();
        let (sink, sub) = subscription_channel(id);
        inner.address_subs.push((*address, sink));
        Ok(sub)
    }
}
