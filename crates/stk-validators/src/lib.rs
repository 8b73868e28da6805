//! stk-validators
//!
//! Validator view: merges three independently refreshed feeds (vote accounts,
//! on-chain validator info, third-party scores) into one ordered list.
//!
//! - `matcher`: two-phase weak join, progressive and cancelable
//! - `directory`: owns the published view; a new feed snapshot cancels the
//!   run still in flight
//! - `feeds`: feed contract implemented outside this crate
//! - `filter`: commission / name / vote-identity filtering
//!
//! Absence is data: a vote record without info or score is a valid merged
//! record, never an error.

mod directory;
mod feeds;
mod filter;
mod matcher;
mod types;

pub use directory::{FeedSnapshot, ValidatorDirectory, ValidatorView};
pub use feeds::{FeedError, ValidatorFeeds};
pub use filter::ValidatorFilter;
pub use matcher::{match_validators, DEFAULT_BATCH_SIZE};
pub use types::*;
