//! Session inputs shared by `decide` and `watch`.
//!
//! Symbols come from a newline-separated file (blank lines and `#` comments
//! skipped). Ticks come from a JSON object mapping symbol to tick.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use straddle_core::{AppConfig, Tick, TickStore};
use straddle_feed::LiveDataStore;
use straddle_manager::EntrySession;

/// Arguments identifying one entry session.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Index name as configured (e.g., "NIFTY", "SENSEX")
    #[arg(long)]
    pub index: String,

    /// Calendar days to expiry
    #[arg(long, allow_negative_numbers = true)]
    pub dte: i64,

    /// File listing the expiry's option symbols, one per line
    #[arg(long)]
    pub symbols: PathBuf,

    /// JSON file mapping symbol to tick
    #[arg(long)]
    pub ticks: PathBuf,
}

impl SessionArgs {
    /// Builds the session and the store backing it.
    ///
    /// # Errors
    /// Returns an error if either input file cannot be read or parsed.
    pub fn open(&self, config: &AppConfig) -> Result<(EntrySession, Arc<LiveDataStore>)> {
        let symbols = read_symbols(&self.symbols)?;
        let store = Arc::new(read_ticks(&self.ticks)?);
        info!(
            index = %self.index,
            dte = self.dte,
            symbols = symbols.len(),
            ticks = store.len(),
            "Loaded session inputs"
        );

        let tick_store: Arc<dyn TickStore> = Arc::clone(&store) as Arc<dyn TickStore>;
        let session = EntrySession::new(
            &self.index,
            self.dte,
            symbols,
            config.entry.clone(),
            tick_store,
        );
        Ok((session, store))
    }
}

pub fn parse_symbols(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn read_symbols(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read symbols file {}", path.display()))?;
    Ok(parse_symbols(&content))
}

pub fn parse_ticks(content: &str) -> Result<LiveDataStore> {
    let snapshot: HashMap<String, Tick> =
        serde_json::from_str(content).context("ticks file must be a JSON object of symbol to tick")?;
    Ok(LiveDataStore::from_snapshot(snapshot))
}

pub fn read_ticks(path: &Path) -> Result<LiveDataStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ticks file {}", path.display()))?;
    parse_ticks(&content).with_context(|| format!("invalid ticks file {}", path.display()))
}
