//! Replay a sequence of blocks against an in-memory registry and print every output as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use commonware_utils::hex;
use gamehub_execution::{
    mocks::{Memory, StaticOwners},
    query,
    state_transition::execute_block,
    Config,
};
use gamehub_types::Call;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML deployment config (owner, registry, log level, score owners).
    #[arg(short, long)]
    config: PathBuf,

    /// JSON array of blocks: `[{ "height": 1, "timestamp": 0, "calls": [...] }]`.
    #[arg(short, long)]
    blocks: PathBuf,

    /// Print the approved games and today's ledger after the last block.
    #[arg(long, default_value_t = false)]
    summary: bool,
}

#[derive(Debug, Deserialize)]
struct Block {
    height: u64,
    /// Block time in microseconds.
    timestamp: u64,
    #[serde(default)]
    calls: Vec<Call>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?.validate()?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    let contents = std::fs::read_to_string(&args.blocks)
        .with_context(|| format!("read blocks from {}", args.blocks.display()))?;
    let blocks: Vec<Block> = serde_json::from_str(&contents).context("parse blocks")?;

    let mut state = Memory::default();
    let owners = StaticOwners::new(config.score_owners);
    let mut now = 0;
    for block in blocks {
        let result = execute_block(
            &mut state,
            &owners,
            config.deployment,
            block.height,
            block.timestamp,
            block.calls,
        )
        .await?;
        info!(
            height = result.height,
            digest = %hex(result.changes_digest.as_ref()),
            "replayed block"
        );
        for output in &result.outputs {
            println!("{}", serde_json::to_string(output)?);
        }
        now = block.timestamp;
    }

    if args.summary {
        let summary = serde_json::json!({
            "approvedGames": query::approved_games(&state)
                .await?
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            "wagers": query::daily_wagers(&state, now, 0).await?,
            "payouts": query::daily_payouts(&state, now, 0).await?,
            "todaysExcess": query::todays_games_excess(&state).await?,
            "developersExcess": query::excess(&state).await?.to_string(),
        });
        println!("{summary}");
    }

    Ok(())
}
