//! Decide CLI command.
//!
//! Runs a single entry check against a tick snapshot, routes the decision
//! through the logging strategy and prints the trade context as JSON.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use straddle_core::ConfigLoader;
use straddle_manager::LoggingStrategy;

use super::inputs::SessionArgs;

/// Arguments for the decide command.
#[derive(Args, Debug, Clone)]
pub struct DecideArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Runs the decide command.
///
/// # Errors
/// Returns an error if the config or input files cannot be loaded.
pub fn run_decide(config_path: &str, args: DecideArgs) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)?;
    let (mut session, _store) = args.session.open(&config)?;

    match session.run_entry_check()? {
        Some(context) => {
            session.dispatch(&context, &LoggingStrategy)?;
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
        None => {
            warn!(
                index = session.index(),
                locked = session.is_entry_done(),
                "No entry decision"
            );
        }
    }

    Ok(())
}
