//! validators.app score feed.

use serde::Deserialize;
use stk_validators::{FeedError, InfoRecord, ScoreRecord, ValidatorFeeds, VoteRecord};
use tracing::debug;

pub const DEFAULT_SCORES_BASE_URL: &str = "https://www.validators.app";

/// Network segment of the score API path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreNetwork {
    Mainnet,
    Testnet,
}

impl ScoreNetwork {
    /// Scores exist for mainnet and testnet only; every non-mainnet cluster
    /// reads the testnet list.
    pub fn for_cluster(cluster: &str) -> Self {
        if cluster == "mainnet-beta" {
            ScoreNetwork::Mainnet
        } else {
            ScoreNetwork::Testnet
        }
    }

    pub fn as_path(&self) -> &'static str {
        match self {
            ScoreNetwork::Mainnet => "mainnet",
            ScoreNetwork::Testnet => "testnet",
        }
    }
}

/// Score feed client. Token is passed in by the caller; do not log it.
#[derive(Clone)]
pub struct ValidatorsAppScores {
    token: String,
    network: ScoreNetwork,
    http: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ValidatorsAppScores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorsAppScores")
            .field("token", &"<redacted>")
            .field("network", &self.network)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ValidatorsAppScores {
    pub fn new(token: String, network: ScoreNetwork) -> Self {
        Self::new_with_base_url(token, network, DEFAULT_SCORES_BASE_URL.to_string())
    }

    pub fn new_with_base_url(token: String, network: ScoreNetwork, base_url: String) -> Self {
        Self {
            token,
            network,
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn build_url(&self) -> String {
        format!(
            "{}/api/v1/validators/{}.json",
            self.base_url.trim_end_matches('/'),
            self.network.as_path()
        )
    }

    pub async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>, FeedError> {
        let resp = self
            .http
            .get(self.build_url())
            .header("Token", self.token.as_str())
            .send()
            .await
            .map_err(|e| FeedError::Transport(format!("validators.app request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: Some(status.as_u16()),
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(format!("validators.app body read failed: {e}")))?;
        let rows: Vec<RawScore> = serde_json::from_slice(&body)
            .map_err(|e| FeedError::Decode(format!("validators.app response: {e}")))?;

        let scores: Vec<ScoreRecord> = rows.into_iter().map(RawScore::into_record).collect();
        debug!(network = self.network.as_path(), rows = scores.len(), "score feed fetched");
        Ok(scores)
    }
}

/// Wire row. Score fields may be null for unranked validators.
#[derive(Debug, Deserialize)]
struct RawScore {
    account: String,
    total_score: Option<i32>,
    root_distance_score: Option<i32>,
    vote_distance_score: Option<i32>,
    skipped_slot_score: Option<i32>,
    software_version_score: Option<i32>,
    stake_concentration_score: Option<i32>,
    data_center_concentration_score: Option<i32>,
    published_information_score: Option<i32>,
    security_report_score: Option<i32>,
}

impl RawScore {
    fn into_record(self) -> ScoreRecord {
        ScoreRecord {
            account: self.account,
            total_score: self.total_score.unwrap_or(0),
            root_distance_score: self.root_distance_score.unwrap_or(0),
            vote_distance_score: self.vote_distance_score.unwrap_or(0),
            skipped_slot_score: self.skipped_slot_score.unwrap_or(0),
            software_version_score: self.software_version_score.unwrap_or(0),
            stake_concentration_score: self.stake_concentration_score.unwrap_or(0),
            data_center_concentration_score: self.data_center_concentration_score.unwrap_or(0),
            published_information_score: self.published_information_score.unwrap_or(0),
            security_report_score: self.security_report_score.unwrap_or(0),
        }
    }
}

/// Votes and infos from `base`, scores from validators.app.
pub struct WithScores<F> {
    pub base: F,
    pub scores: ValidatorsAppScores,
}

#[async_trait::async_trait]
impl<F: ValidatorFeeds> ValidatorFeeds for WithScores<F> {
    async fn fetch_vote_records(&self) -> Result<Vec<VoteRecord>, FeedError> {
        self.base.fetch_vote_records().await
    }

    async fn fetch_info_records(&self) -> Result<Vec<InfoRecord>, FeedError> {
        self.base.fetch_info_records().await
    }

    async fn fetch_score_records(&self) -> Result<Vec<ScoreRecord>, FeedError> {
        self.scores.fetch_scores().await
    }
}
