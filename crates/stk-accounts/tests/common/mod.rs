#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use stk_accounts::{AccountReconciler, AccountsView, ReconcilerSettings, SessionPhase};
use stk_derive::{derive_with_seed, Address, STAKE_PROGRAM_ID};
use stk_testkit::MemoryLedger;
use tokio::sync::watch;

pub fn program() -> Address {
    STAKE_PROGRAM_ID.parse().unwrap()
}

pub fn derived(owner: &Address, seed: &str) -> Address {
    derive_with_seed(owner, seed, &program()).unwrap()
}

pub fn reconciler(ledger: &Arc<MemoryLedger>) -> AccountReconciler<MemoryLedger> {
    AccountReconciler::new(Arc::clone(ledger), ReconcilerSettings::new(program()))
}

pub async fn wait_for(
    rx: &mut watch::Receiver<AccountsView>,
    cond: impl FnMut(&AccountsView) -> bool,
) -> AccountsView {
    tokio::time::timeout(Duration::from_secs(30), rx.wait_for(cond))
        .await
        .expect("timed out waiting for view")
        .expect("view channel closed")
        .clone()
}

pub async fn wait_live(rx: &mut watch::Receiver<AccountsView>) -> AccountsView {
    wait_for(rx, |v| v.phase == SessionPhase::Live).await
}

/// Poll `cond` until it holds, yielding to the session worker in between.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition never held");
}
