//! stk-testkit
//!
//! In-process ledger double for reconciler tests. No network, no randomness:
//! tests decide which channel (owner filter, exact address, both, neither)
//! observes each change, which fetches miss, and which scans fail.

mod fixtures;
mod memory_ledger;

pub use fixtures::{address, delegated, initialized};
pub use memory_ledger::{Delivery, MemoryLedger};
