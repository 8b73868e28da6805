//! stk-accounts
//!
//! Owner-scoped stake-account collection kept in sync with the ledger.
//!
//! Architectural decisions:
//! - One worker task per owner owns every mutation; readers only see the
//!   published `watch` snapshot.
//! - Every change is a pure reduction `(current, event) -> next` applied to
//!   the state current at arrival, never to a captured copy.
//! - Two overlapping subscription channels (owner filter + one per tracked
//!   address) feed the same reducer; replays are no-ops.
//! - Owner change tears the whole session down before the next one starts.

mod reducer;
mod retry;
mod session;
mod tracked;

pub use reducer::{reduce, reduce_insert, reduce_rewards, ReduceContext};
pub use retry::{poll_until_visible, scan_with_retry, RetryPolicy};
pub use session::{AccountReconciler, AccountsView, ReconcilerSettings, SessionPhase};
pub use tracked::{AccountCollection, SortPolicy, TrackedAccount};
