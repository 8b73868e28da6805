//! stk-feeds
//!
//! Concrete sources for the three validator feeds.
//!
//! - [`ValidatorsAppScores`]: reputation scores over HTTP.
//! - [`JsonFileFeeds`]: all three snapshots from JSON files on disk.
//! - [`WithScores`]: votes and infos from one source, scores from another.
//!
//! The score API token is read by the caller and passed in; never log it.

mod files;
mod scores;

pub use files::JsonFileFeeds;
pub use scores::{ScoreNetwork, ValidatorsAppScores, WithScores, DEFAULT_SCORES_BASE_URL};
