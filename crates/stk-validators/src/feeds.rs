//! Feed boundary for the validator view.
//!
//! The three feeds are independent, unversioned snapshots; no cursor is
//! shared between them. Concrete sources live outside this crate.

use std::fmt;

use crate::{InfoRecord, ScoreRecord, VoteRecord};

/// Errors a [`ValidatorFeeds`] implementation may return.
#[derive(Debug)]
pub enum FeedError {
    /// Network or IO failure.
    Transport(String),
    /// The upstream returned an application-level error.
    Api { status: Option<u16>, message: String },
    /// A payload could not be decoded.
    Decode(String),
    /// A required setting (e.g. API token) is missing.
    Config(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Transport(msg) => write!(f, "transport error: {msg}"),
            FeedError::Api {
                status: Some(s),
                message,
            } => write!(f, "feed api error status={s}: {message}"),
            FeedError::Api {
                status: None,
                message,
            } => write!(f, "feed api error: {message}"),
            FeedError::Decode(msg) => write!(f, "decode error: {msg}"),
            FeedError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

/// Source of the three validator snapshots.
#[async_trait::async_trait]
pub trait ValidatorFeeds: Send + Sync {
    async fn fetch_vote_records(&self) -> Result<Vec<VoteRecord>, FeedError>;

    async fn fetch_info_records(&self) -> Result<Vec<InfoRecord>, FeedError>;

    async fn fetch_score_records(&self) -> Result<Vec<ScoreRecord>, FeedError>;
}
