use std::fmt;

use stk_derive::Address;

use crate::{AccountSnapshot, Subscription};

/// Errors a [`LedgerClient`] may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Connection or transport failure.
    Transport(String),
    /// The node answered with an RPC error.
    Rpc { code: Option<i64>, message: String },
    /// The account payload could not be parsed.
    Decode(String),
    /// A subscription could not be opened.
    Subscription(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Transport(msg) => write!(f, "transport error: {msg}"),
            LedgerError::Rpc {
                code: Some(c),
                message,
            } => write!(f, "rpc error code={c}: {message}"),
            LedgerError::Rpc {
                code: None,
                message,
            } => write!(f, "rpc error: {message}"),
            LedgerError::Decode(msg) => write!(f, "decode error: {msg}"),
            LedgerError::Subscription(msg) => write!(f, "subscription error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Remote ledger contract consumed by the account reconciler.
///
/// Implementations must be `Send + Sync`; the reconciler shares one client
/// between its session worker and optimistic-insert pollers.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Full scan for every stake account `owner` holds an authority over.
    async fn scan_accounts_for_owner(
        &self,
        owner: &Address,
    ) -> Result<Vec<AccountSnapshot>, LedgerError>;

    /// Current contents of `address`; `Ok(None)` if it does not (yet) resolve.
    async fn fetch_account(&self, address: &Address)
        -> Result<Option<AccountSnapshot>, LedgerError>;

    /// Changes to any account whose staker authority is `owner`.
    ///
    /// Best effort: notifications may be dropped, and closures are not always
    /// reported on this channel.
    fn subscribe_by_owner(&self, owner: &Address) -> Result<Subscription, LedgerError>;

    /// Changes to exactly `address`, including its closure.
    fn subscribe_by_address(&self, address: &Address) -> Result<Subscription, LedgerError>;
}
