use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use stk_config::{load_layered_yaml, resolve_score_feed_token};
use stk_feeds::{JsonFileFeeds, ScoreNetwork, ValidatorsAppScores, WithScores};
use stk_validators::{total_activated_stake, ValidatorDirectory, ValidatorFilter};
use tracing::info;

pub struct MatchArgs {
    pub votes: PathBuf,
    pub infos: PathBuf,
    pub scores: Option<PathBuf>,
    pub config_paths: Vec<PathBuf>,
    pub max_commission: u8,
    pub query: String,
    pub batch_size: Option<usize>,
}

pub async fn run_match(args: MatchArgs) -> Result<()> {
    // No paths merges to an empty document: all defaults.
    let loaded = load_layered_yaml(&args.config_paths)?;
    let cfg = loaded.stake()?;

    let batch_size = args.batch_size.unwrap_or(cfg.matcher.batch_size);
    if batch_size == 0 {
        bail!("--batch-size must be >= 1");
    }

    let from_api = args.scores.is_none();
    let base = JsonFileFeeds::new(args.votes, args.infos, args.scores.unwrap_or_default());
    let mut directory = ValidatorDirectory::new(batch_size);

    let generation = if from_api {
        let token = resolve_score_feed_token(&loaded.config_json, true)?
            .context("score feed token unresolved")?;
        let network = ScoreNetwork::for_cluster(cfg.cluster.name.as_str());
        let feeds = WithScores {
            base,
            scores: ValidatorsAppScores::new_with_base_url(
                token.into_inner(),
                network,
                cfg.feeds.scores.base_url.clone(),
            ),
        };
        directory.refresh(&feeds).await
    } else {
        directory.refresh(&base).await
    }
    .context("validator feeds unavailable")?;

    directory.settle().await;
    let view = directory.snapshot();

    let filter = ValidatorFilter {
        max_commission: args.max_commission,
        query: args.query,
    };
    let kept = filter.apply(&view.records);
    info!(
        generation,
        merged = view.records.len(),
        kept = kept.len(),
        total_stake = total_activated_stake(&view.records),
        "validators matched"
    );

    for record in &kept {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}
