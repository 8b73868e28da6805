//! Validator feed snapshots stored as JSON arrays on disk.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use stk_validators::{FeedError, InfoRecord, ScoreRecord, ValidatorFeeds, VoteRecord};

#[derive(Clone, Debug)]
pub struct JsonFileFeeds {
    pub votes: PathBuf,
    pub infos: PathBuf,
    pub scores: PathBuf,
}

impl JsonFileFeeds {
    pub fn new(votes: impl Into<PathBuf>, infos: impl Into<PathBuf>, scores: impl Into<PathBuf>) -> Self {
        Self {
            votes: votes.into(),
            infos: infos.into(),
            scores: scores.into(),
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FeedError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| FeedError::Transport(format!("read {}: {e}", path.display())))?;
    serde_json::from_slice(&raw)
        .map_err(|e| FeedError::Decode(format!("parse {}: {e}", path.display())))
}

#[async_trait::async_trait]
impl ValidatorFeeds for JsonFileFeeds {
    async fn fetch_vote_records(&self) -> Result<Vec<VoteRecord>, FeedError> {
        read_json(&self.votes).await
    }

    async fn fetch_info_records(&self) -> Result<Vec<InfoRecord>, FeedError> {
        read_json(&self.infos).await
    }

    async fn fetch_score_records(&self) -> Result<Vec<ScoreRecord>, FeedError> {
        read_json(&self.scores).await
    }
}
