//! Owner session lifecycle.
//!
//! ```text
//! Uninitialized --set_owner(Some)--> Discovering --scan done--> Live
//!       ^                                                         |
//!       +------------- set_owner(other | None) -> TornDown <------+
//! ```
//!
//! The worker task is the only writer of the published view. Commands from
//! the handle (optimistic inserts, reward history) are queued to the worker
//! so they go through the same reducer as subscription events.

use std::collections::BTreeSet;
use std::sync::Arc;

use stk_config::AccountsConfig;
use stk_derive::{find_first_unused_seed, Address, DeriveError, SeedLabel};
use stk_ledger::{ChangeEvent, InflationReward, LedgerClient, Subscription};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::{StreamExt, StreamMap};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::reducer::{reduce, reduce_insert, reduce_rewards, track_scanned, ReduceContext};
use crate::retry::{poll_until_visible, scan_with_retry, RetryPolicy};
use crate::tracked::{AccountCollection, SortPolicy, TrackedAccount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Discovering,
    Live,
    TornDown,
}

/// Published read-only state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountsView {
    pub owner: Option<Address>,
    pub phase: SessionPhase,
    pub accounts: AccountCollection,
}

impl AccountsView {
    fn empty(owner: Option<Address>, phase: SessionPhase, sort: SortPolicy) -> Self {
        Self {
            owner,
            phase,
            accounts: AccountCollection::new(sort),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Program that owns every tracked account; also the derivation base.
    pub program: Address,
    /// Seed indices tried when labelling an observed address.
    pub seed_scan_range: u32,
    pub sort: SortPolicy,
    pub discovery: RetryPolicy,
    pub optimistic_insert: RetryPolicy,
}

impl ReconcilerSettings {
    pub fn new(program: Address) -> Self {
        Self {
            program,
            seed_scan_range: 20,
            sort: SortPolicy::default(),
            discovery: RetryPolicy::DISCOVERY,
            optimistic_insert: RetryPolicy::OPTIMISTIC_INSERT,
        }
    }

    /// Settings from the `accounts` config section.
    pub fn from_config(cfg: &AccountsConfig) -> anyhow::Result<Self> {
        Ok(Self {
            program: cfg.program_address()?,
            seed_scan_range: cfg.seed_scan_range,
            sort: cfg.sort.into(),
            discovery: cfg.discovery.into(),
            optimistic_insert: cfg.optimistic_insert.into(),
        })
    }
}

enum Command {
    Insert(TrackedAccount),
    Rewards {
        address: Address,
        rewards: Vec<InflationReward>,
    },
}

struct Session {
    owner: Address,
    cancel: CancellationToken,
    commands: mpsc::UnboundedSender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Handle to the owner's reconciled stake-account collection.
///
/// Must be driven from within a tokio runtime. Dropping the handle cancels the
/// session; every subscription is released when its worker exits.
pub struct AccountReconciler<L: LedgerClient + ?Sized + 'static> {
    ledger: Arc<L>,
    settings: ReconcilerSettings,
    view: Arc<watch::Sender<AccountsView>>,
    session: Option<Session>,
}

impl<L: LedgerClient + ?Sized + 'static> AccountReconciler<L> {
    pub fn new(ledger: Arc<L>, settings: ReconcilerSettings) -> Self {
        let (view, _rx) = watch::channel(AccountsView::empty(
            None,
            SessionPhase::Uninitialized,
            settings.sort,
        ));
        Self {
            ledger,
            settings,
            view: Arc::new(view),
            session: None,
        }
    }

    pub fn settings(&self) -> &ReconcilerSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> watch::Receiver<AccountsView> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> AccountsView {
        self.view.borrow().clone()
    }

    /// Owner of the running session, if any.
    pub fn owner(&self) -> Option<Address> {
        self.session.as_ref().map(|s| s.owner)
    }

    /// Switch the tracked owner.
    ///
    /// Same owner: no-op. Otherwise the running session is cancelled and
    /// awaited (all its subscriptions released) before a new one starts.
    pub async fn set_owner(&mut self, owner: Option<Address>) {
        if self.owner() == owner {
            return;
        }
        self.teardown().await;
        if let Some(owner) = owner {
            self.start(owner);
        }
    }

    /// Tear down the running session and publish an empty `TornDown` view.
    pub async fn shutdown(&mut self) {
        self.teardown().await;
    }

    async fn teardown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.cancel.cancel();
        if let Some(worker) = session.worker.take() {
            if let Err(err) = worker.await {
                warn!(owner = %session.owner, error = %err, "session worker ended abnormally");
            }
        }
        self.view.send_replace(AccountsView::empty(
            None,
            SessionPhase::TornDown,
            self.settings.sort,
        ));
        info!(owner = %session.owner, "stake account session torn down");
    }

    fn start(&mut self, owner: Address) {
        let cancel = CancellationToken::new();
        let (commands, rx) = mpsc::unbounded_channel();
        let worker = SessionWorker {
            ledger: Arc::clone(&self.ledger),
            settings: self.settings.clone(),
            view: Arc::clone(&self.view),
            cancel: cancel.clone(),
            ctx: ReduceContext {
                owner,
                program: self.settings.program,
                seed_scan_range: self.settings.seed_scan_range,
            },
        };
        let handle = tokio::spawn(worker.run(rx));
        self.session = Some(Session {
            owner,
            cancel,
            commands,
            worker: Some(handle),
        });
    }

    /// Poll for a freshly created account and add it once visible.
    ///
    /// Returns `false` when no session is running. The poll is cancelled with
    /// the session; if it gives up, the subscriptions may still deliver the
    /// account.
    pub fn request_optimistic_insert(&self, address: Address, seed: impl Into<String>) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let ledger = Arc::clone(&self.ledger);
        let commands = session.commands.clone();
        let cancel = session.cancel.child_token();
        let policy = self.settings.optimistic_insert;
        let seed = SeedLabel::Known(seed.into());

        tokio::spawn(async move {
            let found = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                found = poll_until_visible(&*ledger, &address, policy) => found,
            };
            if let Some(snapshot) = found {
                let account = TrackedAccount::from_snapshot(snapshot, seed);
                // Closed channel means the session ended meanwhile.
                let _ = commands.send(Command::Insert(account));
            }
        });
        true
    }

    /// Attach reward history to a tracked account.
    pub fn record_rewards(&self, address: Address, rewards: Vec<InflationReward>) -> bool {
        match &self.session {
            Some(session) => session
                .commands
                .send(Command::Rewards { address, rewards })
                .is_ok(),
            None => false,
        }
    }

    /// Lowest unused seed for the current owner, computed against the
    /// published collection. `Ok(None)` when no owner is set.
    pub fn next_free_seed(&self) -> Result<Option<String>, DeriveError> {
        let Some(owner) = self.owner() else {
            return Ok(None);
        };
        let taken = self.view.borrow().accounts.addresses();
        find_first_unused_seed(&owner, &self.settings.program, taken.iter()).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

enum Input {
    Command(Command),
    Owner(ChangeEvent),
    OwnerClosed,
    Address(ChangeEvent),
}

struct SessionWorker<L: LedgerClient + ?Sized + 'static> {
    ledger: Arc<L>,
    settings: ReconcilerSettings,
    view: Arc<watch::Sender<AccountsView>>,
    cancel: CancellationToken,
    ctx: ReduceContext,
}

impl<L: LedgerClient + ?Sized + 'static> SessionWorker<L> {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let owner = self.ctx.owner;
        self.view.send_replace(AccountsView::empty(
            Some(owner),
            SessionPhase::Discovering,
            self.settings.sort,
        ));
        info!(owner = %owner, "discovering stake accounts");

        let scanned = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            scanned = scan_with_retry(&*self.ledger, &owner, self.settings.discovery) => scanned,
        };
        let scanned = scanned.unwrap_or_else(|| {
            warn!(owner = %owner, "owner scan exhausted retries; starting empty");
            Vec::new()
        });
        let initial = AccountCollection::from_accounts(
            self.settings.sort,
            scanned.into_iter().map(|s| track_scanned(s, &self.ctx)),
        );

        // Subscriptions open before Live is published so no change after the
        // scan goes unobserved by a reader that waited for Live.
        let mut owner_sub = match self.ledger.subscribe_by_owner(&owner) {
            Ok(sub) => Some(sub),
            Err(err) => {
                warn!(owner = %owner, error = %err, "owner subscription unavailable; relying on per-address channel");
                None
            }
        };
        let mut address_subs: StreamMap<Address, Subscription> = StreamMap::new();
        self.sync_address_subscriptions(&initial.addresses(), &mut address_subs);

        info!(owner = %owner, accounts = initial.len(), "stake accounts live");
        self.view.send_modify(|v| {
            v.phase = SessionPhase::Live;
            v.accounts = initial;
        });

        loop {
            let input = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(cmd) = commands.recv() => Input::Command(cmd),
                event = next_owner_event(&mut owner_sub) => match event {
                    Some(event) => Input::Owner(event),
                    None => Input::OwnerClosed,
                },
                Some((_, event)) = address_subs.next(), if !address_subs.is_empty() => Input::Address(event),
            };

            let changed = match input {
                Input::Command(Command::Insert(account)) => {
                    debug!(address = %account.address, "confirmed insert");
                    self.apply(|c| reduce_insert(c, &account))
                }
                Input::Command(Command::Rewards { address, rewards }) => {
                    self.apply(|c| reduce_rewards(c, &address, &rewards))
                }
                Input::Owner(event) => {
                    debug!(address = %event.address(), channel = "owner", "account change");
                    self.apply(|c| reduce(c, &event, &self.ctx))
                }
                Input::Address(event) => {
                    debug!(address = %event.address(), channel = "address", "account change");
                    self.apply(|c| reduce(c, &event, &self.ctx))
                }
                Input::OwnerClosed => {
                    warn!(owner = %owner, "owner subscription ended");
                    owner_sub = None;
                    None
                }
            };

            if let Some(tracked) = changed {
                self.sync_address_subscriptions(&tracked, &mut address_subs);
            }
        }

        debug!(
            owner = %owner,
            released = address_subs.len() + usize::from(owner_sub.is_some()),
            "session worker exiting"
        );
    }

    /// Reduce against the state current at this instant and publish on change.
    ///
    /// Returns the new membership when it differs from the previous one.
    fn apply<F>(&self, step: F) -> Option<BTreeSet<Address>>
    where
        F: FnOnce(&AccountCollection) -> Option<AccountCollection>,
    {
        let mut membership = None;
        self.view.send_if_modified(|v| match step(&v.accounts) {
            Some(next) => {
                let before = v.accounts.addresses();
                let after = next.addresses();
                if before != after {
                    membership = Some(after);
                }
                v.accounts = next;
                true
            }
            None => false,
        });
        membership
    }

    /// Bring the per-address subscriptions in line with `tracked`.
    fn sync_address_subscriptions(
        &self,
        tracked: &BTreeSet<Address>,
        subs: &mut StreamMap<Address, Subscription>,
    ) {
        let stale: Vec<Address> = subs.keys().filter(|a| !tracked.contains(a)).copied().collect();
        for address in stale {
            // Dropping the subscription releases it.
            subs.remove(&address);
            debug!(address = %address, "address subscription released");
        }
        for address in tracked {
            if subs.contains_key(address) {
                continue;
            }
            match self.ledger.subscribe_by_address(address) {
                Ok(sub) => {
                    subs.insert(*address, sub);
                }
                Err(err) => {
                    warn!(address = %address, error = %err, "address subscription unavailable")
                }
            }
        }
    }
}

async fn next_owner_event(sub: &mut Option<Subscription>) -> Option<ChangeEvent> {
    match sub {
        Some(sub) => sub.next().await,
        None => std::future::pending().await,
    }
}
