//! Nearest CLI command.
//!
//! Reads option chains from a JSON file and prints the index expiring
//! first together with its DTE. Each chain entry looks like
//! `{"index": "NIFTY", "expiry": "28-10-2025", "symbols": [...]}`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Deserialize;
use tracing::warn;

use straddle_feed::{ChainSummary, ExpiryResolver, StaticExpiryResolver};

/// Arguments for the nearest command.
#[derive(Args, Debug, Clone)]
pub struct NearestArgs {
    /// JSON file with an array of chains
    #[arg(long)]
    pub chains: PathBuf,

    /// Date to measure DTE from, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct RawChain {
    index: String,
    expiry: String,
    #[serde(default)]
    symbols: Vec<String>,
}

fn parse_chains(content: &str) -> Result<Vec<ChainSummary>> {
    let raw: Vec<RawChain> = serde_json::from_str(content).context("chains file must be a JSON array")?;
    raw.into_iter()
        .map(|chain| {
            let expiry = ChainSummary::parse_expiry(&chain.expiry)?;
            Ok(ChainSummary::new(&chain.index, expiry, chain.symbols))
        })
        .collect()
}

/// Runs the nearest command.
///
/// # Errors
/// Returns an error if the chains file cannot be read or parsed.
pub async fn run_nearest(args: NearestArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.chains)
        .with_context(|| format!("failed to read chains file {}", args.chains.display()))?;
    let chains = parse_chains(&content)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let count = chains.len();
    let resolver = StaticExpiryResolver::new(chains, today);

    match resolver.resolve().await? {
        Some(selection) => {
            println!("{} {} {}", selection.index, selection.expiry, selection.status());
            println!("{}", serde_json::to_string_pretty(&selection)?);
        }
        None => warn!(chains = count, "No chains to select from"),
    }

    Ok(())
}
