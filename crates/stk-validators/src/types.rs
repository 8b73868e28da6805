use serde::{Deserialize, Serialize};

/// One voting identity from the vote-account status list.
///
/// Unique by `node_identity` within one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    #[serde(rename = "nodePubkey")]
    pub node_identity: String,
    #[serde(rename = "votePubkey")]
    pub vote_identity: String,
    /// Commission percentage (0..=100).
    pub commission: u8,
    #[serde(rename = "activatedStake")]
    pub activated_stake: u64,
    #[serde(rename = "lastVote", default)]
    pub last_vote: u64,
    #[serde(default)]
    pub delinquent: bool,
}

impl VoteRecord {
    pub fn new(
        node_identity: impl Into<String>,
        vote_identity: impl Into<String>,
        commission: u8,
        activated_stake: u64,
    ) -> Self {
        Self {
            node_identity: node_identity.into(),
            vote_identity: vote_identity.into(),
            commission,
            activated_stake,
            last_vote: 0,
            delinquent: false,
        }
    }
}

/// Off-chain registered metadata for a node identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRecord {
    #[serde(rename = "identity")]
    pub node_identity: String,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(rename = "keybaseUsername", default)]
    pub keybase_username: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl InfoRecord {
    pub fn new(node_identity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            node_identity: node_identity.into(),
            name: name.into(),
            website: None,
            keybase_username: None,
            details: None,
        }
    }
}

/// Third-party reputation score. `account` is the join key against
/// [`VoteRecord::node_identity`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreRecord {
    pub account: String,
    #[serde(default)]
    pub total_score: i32,
    #[serde(default)]
    pub root_distance_score: i32,
    #[serde(default)]
    pub vote_distance_score: i32,
    #[serde(default)]
    pub skipped_slot_score: i32,
    #[serde(default)]
    pub software_version_score: i32,
    #[serde(default)]
    pub stake_concentration_score: i32,
    #[serde(default)]
    pub data_center_concentration_score: i32,
    #[serde(default)]
    pub published_information_score: i32,
    #[serde(default)]
    pub security_report_score: i32,
}

impl ScoreRecord {
    /// Highest attainable `total_score`.
    pub const MAX_TOTAL_SCORE: i32 = 11;

    pub fn new(account: impl Into<String>, total_score: i32) -> Self {
        Self {
            account: account.into(),
            total_score,
            ..Self::default()
        }
    }
}

/// A vote record with whatever info and score could be joined to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub vote: VoteRecord,
    pub info: Option<InfoRecord>,
    pub score: Option<ScoreRecord>,
}

impl MergedRecord {
    pub fn display_name(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.name.as_str())
    }

    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }
}

/// Sum of activated stake over `records`.
pub fn total_activated_stake(records: &[MergedRecord]) -> u64 {
    records
        .iter()
        .map(|r| r.vote.activated_stake)
        .fold(0u64, u64::saturating_add)
}
