//! Bounded fixed-delay retries against the ledger.

use std::time::Duration;

use stk_config::RetryConfig;
use stk_derive::Address;
use stk_ledger::{AccountSnapshot, LedgerClient};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Post-creation visibility poll.
    pub const OPTIMISTIC_INSERT: RetryPolicy = RetryPolicy {
        attempts: 5,
        delay: Duration::from_millis(600),
    };

    /// Initial owner scan.
    pub const DISCOVERY: RetryPolicy = RetryPolicy {
        attempts: 3,
        delay: Duration::from_millis(600),
    };
}

impl From<RetryConfig> for RetryPolicy {
    fn from(cfg: RetryConfig) -> Self {
        Self {
            attempts: cfg.attempts,
            delay: cfg.delay(),
        }
    }
}

/// Fetch `address` until it resolves or the policy is exhausted.
///
/// A miss and a fetch error are treated alike. `None` means "not yet seen";
/// subscriptions may still deliver the account later.
pub async fn poll_until_visible<L>(
    ledger: &L,
    address: &Address,
    policy: RetryPolicy,
) -> Option<AccountSnapshot>
where
    L: LedgerClient + ?Sized,
{
    for attempt in 1..=policy.attempts {
        match ledger.fetch_account(address).await {
            Ok(Some(snapshot)) => {
                debug!(address = %address, attempt, "account visible");
                return Some(snapshot);
            }
            Ok(None) => debug!(address = %address, attempt, "account not visible yet"),
            Err(err) => debug!(address = %address, attempt, error = %err, "account fetch failed"),
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }
    warn!(
        address = %address,
        attempts = policy.attempts,
        "account not visible after polling; leaving it to subscriptions"
    );
    None
}

/// Scan the owner's accounts, retrying transport failures.
pub async fn scan_with_retry<L>(
    ledger: &L,
    owner: &Address,
    policy: RetryPolicy,
) -> Option<Vec<AccountSnapshot>>
where
    L: LedgerClient + ?Sized,
{
    for attempt in 1..=policy.attempts {
        match ledger.scan_accounts_for_owner(owner).await {
            Ok(found) => return Some(found),
            Err(err) => warn!(owner = %owner, attempt, error = %err, "owner scan failed"),
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }
    None
}
