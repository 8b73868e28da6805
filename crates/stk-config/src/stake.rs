//! Typed configuration view.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stk_derive::{Address, STAKE_PROGRAM_ID};

pub(crate) const DEFAULT_TOKEN_ENV: &str = "VALIDATORS_APP_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    MainnetBeta,
    Testnet,
    Devnet,
    Localnet,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Testnet => "testnet",
            Cluster::Devnet => "devnet",
            Cluster::Localnet => "localnet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub name: Cluster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub batch_size: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Seed,
    Balance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub program_id: String,
    pub seed_scan_range: u32,
    pub sort: SortKey,
    pub optimistic_insert: RetryConfig,
    pub discovery: RetryConfig,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            program_id: STAKE_PROGRAM_ID.to_string(),
            seed_scan_range: 20,
            sort: SortKey::Seed,
            optimistic_insert: RetryConfig {
                attempts: 5,
                delay_ms: 600,
            },
            discovery: RetryConfig {
                attempts: 3,
                delay_ms: 600,
            },
        }
    }
}

impl AccountsConfig {
    pub fn program_address(&self) -> Result<Address> {
        self.program_id
            .parse()
            .with_context(|| format!("accounts.program_id is not an address: {}", self.program_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreFeedConfig {
    pub base_url: String,
    /// Name of the env var holding the API token (never the token itself).
    pub token_env: String,
}

impl Default for ScoreFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.validators.app".to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub scores: ScoreFeedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    pub cluster: ClusterConfig,
    pub matcher: MatcherConfig,
    pub accounts: AccountsConfig,
    pub feeds: FeedsConfig,
}

impl StakeConfig {
    /// Decode and validate. Missing keys take their defaults; unknown keys are
    /// left to [`crate::report_unused_keys`].
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: StakeConfig =
            serde_json::from_value(config_json.clone()).context("config does not match schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.matcher.batch_size == 0 {
            bail!("CONFIG_INVALID matcher.batch_size must be >= 1");
        }
        if self.accounts.seed_scan_range == 0 {
            bail!("CONFIG_INVALID accounts.seed_scan_range must be >= 1");
        }
        if self.accounts.optimistic_insert.attempts == 0 {
            bail!("CONFIG_INVALID accounts.optimistic_insert.attempts must be >= 1");
        }
        if self.accounts.discovery.attempts == 0 {
            bail!("CONFIG_INVALID accounts.discovery.attempts must be >= 1");
        }
        self.accounts.program_address()?;
        Ok(())
    }
}
