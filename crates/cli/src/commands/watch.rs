//! Watch CLI command.
//!
//! Polls for an entry decision, then monitors the decided straddle against
//! the loaded snapshot. Runs until the requested number of updates has been
//! logged or Ctrl-C.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio::sync::mpsc;
use tracing::{info, warn};

use straddle_core::ConfigLoader;
use straddle_manager::{LoggingStrategy, MonitorUpdate};

use super::inputs::SessionArgs;

/// Arguments for the watch command.
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Seconds between monitor iterations (defaults to the config value)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: Option<u64>,

    /// Stop after this many updates (runs until Ctrl-C if omitted)
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Entry checks to attempt before giving up
    #[arg(long, default_value_t = 1)]
    pub entry_attempts: u32,
}

/// Runs the watch command.
///
/// # Errors
/// Returns an error if the config or input files cannot be loaded, or the
/// strategy handler rejects the decision.
pub async fn run_watch(config_path: &str, args: WatchArgs) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)?;
    let (mut session, _store) = args.session.open(&config)?;

    let interval = args
        .interval_secs
        .map_or_else(|| config.monitor.interval(), Duration::from_secs);

    let Some(context) = session
        .wait_for_entry(interval, Some(args.entry_attempts.max(1)))
        .await?
    else {
        warn!(index = session.index(), "No entry decision, nothing to monitor");
        return Ok(());
    };
    session.dispatch(&context, &LoggingStrategy)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<MonitorUpdate>();
    let mut monitor = session.start_monitor(context, interval, move |ctx, update| {
        info!(
            index = %ctx.index,
            strike = ctx.atm_strike,
            call = %update.call_ltp,
            put = %update.put_ltp,
            straddle = %update.straddle,
            underlying = %update.underlying_ltp,
            "Straddle update"
        );
        tx.send(update.clone())?;
        Ok(())
    });

    let mut received = 0u32;
    loop {
        tokio::select! {
            update = rx.recv() => {
                if update.is_none() {
                    break;
                }
                received += 1;
                if args.iterations.is_some_and(|max| received >= max) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    monitor.stop(config.monitor.join_timeout()).await;
    info!(updates = received, "Watch finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        watch: WatchArgs,
    }

    fn parse(extra: &[&str]) -> Result<WatchArgs, clap::Error> {
        let base = [
            "straddle-watch",
            "--index",
            "NIFTY",
            "--dte",
            "0",
            "--symbols",
            "symbols.txt",
            "--ticks",
            "ticks.json",
        ];
        Harness::try_parse_from(base.iter().chain(extra)).map(|h| h.watch)
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(parse(&["--interval-secs", "0"]).is_err());
    }

    #[test]
    fn interval_and_iterations_parse() {
        let args = parse(&["--interval-secs", "3", "--iterations", "4"]).unwrap();
        assert_eq!(args.interval_secs, Some(3));
        assert_eq!(args.iterations, Some(4));
        assert_eq!(args.entry_attempts, 1);
    }

    #[test]
    fn interval_defaults_to_config() {
        assert_eq!(parse(&[]).unwrap().interval_secs, None);
    }
}
