use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stk_derive::Address;

mod commands;

#[derive(Parser)]
#[command(name = "stk")]
#[command(about = "Stake account and validator tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the address for (owner, seed, program)
    Derive {
        #[arg(long)]
        owner: Address,

        #[arg(long)]
        seed: String,

        /// Program id (overrides accounts.program_id)
        #[arg(long)]
        program: Option<Address>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<PathBuf>,
    },

    /// Lowest seed whose derived address is not already taken
    NextSeed {
        #[arg(long)]
        owner: Address,

        /// Addresses already in use (repeatable)
        #[arg(long)]
        existing: Vec<Address>,

        #[arg(long)]
        program: Option<Address>,

        #[arg(long = "config")]
        config_paths: Vec<PathBuf>,
    },

    /// Merge vote/info/score snapshots and print matching validators as JSON lines
    Match {
        #[arg(long)]
        votes: PathBuf,

        #[arg(long)]
        infos: PathBuf,

        /// Score snapshot file. Without it, scores come from validators.app
        /// using the token named in config.
        #[arg(long)]
        scores: Option<PathBuf>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<PathBuf>,

        #[arg(long, default_value_t = 100)]
        max_commission: u8,

        /// Case-insensitive match on vote identity or validator name
        #[arg(long, default_value = "")]
        query: String,

        /// Overrides matcher.batch_size from config
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Derive {
            owner,
            seed,
            program,
            config_paths,
        } => commands::seeds::derive(&owner, &seed, program, &config_paths)?,

        Commands::NextSeed {
            owner,
            existing,
            program,
            config_paths,
        } => commands::seeds::next_seed(&owner, &existing, program, &config_paths)?,

        Commands::Match {
            votes,
            infos,
            scores,
            config_paths,
            max_commission,
            query,
            batch_size,
        } => {
            let args = commands::validators::MatchArgs {
                votes,
                infos,
                scores,
                config_paths,
                max_commission,
                query,
                batch_size,
            };
            commands::validators::run_match(args).await?
        }

        Commands::ConfigHash { paths } => {
            let loaded = stk_config::load_layered_yaml(&paths)?;
            let report =
                stk_config::report_unused_keys(&loaded.config_json, stk_config::UnusedKeyPolicy::Warn)?;
            for pointer in &report.unused_leaf_pointers {
                tracing::warn!(pointer = %pointer, "unused config key");
            }
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
