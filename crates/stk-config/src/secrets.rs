//! Runtime secret resolution.
//!
//! Config YAML stores only env var NAMES (`feeds.scores.token_env`). Callers
//! resolve once at startup and pass the result into constructors. `Debug`
//! redacts values; errors name the variable, never its value.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::stake::DEFAULT_TOKEN_ENV;

/// Score-feed API token resolved from the environment.
#[derive(Clone)]
pub struct ScoreFeedToken {
    /// Env var the value came from.
    pub env_var: String,
    value: String,
}

impl ScoreFeedToken {
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

impl std::fmt::Debug for ScoreFeedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreFeedToken")
            .field("env_var", &self.env_var)
            .field("value", &"<REDACTED>")
            .finish()
    }
}

fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve the score-feed token named by `/feeds/scores/token_env`
/// (default `VALIDATORS_APP_TOKEN`).
///
/// With `required == false` a missing variable yields `Ok(None)`; the score
/// feed is optional and the matcher runs without scores.
pub fn resolve_score_feed_token(config_json: &Value, required: bool) -> Result<Option<ScoreFeedToken>> {
    let env_var = read_str_at(config_json, "/feeds/scores/token_env")
        .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string());

    match resolve_env(&env_var) {
        Some(value) => Ok(Some(ScoreFeedToken { env_var, value })),
        None if required => bail!(
            "SECRETS_MISSING: required env var '{}' (score feed token) is not set or empty",
            env_var
        ),
        None => Ok(None),
    }
}
