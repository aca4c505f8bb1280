use clap::{Parser, Subcommand};

mod commands;

use commands::{DecideArgs, NearestArgs, WatchArgs};

#[derive(Parser)]
#[command(name = "straddle-watch")]
#[command(about = "ATM straddle entry decisions and live straddle monitoring", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one entry check against a tick snapshot and print the trade context
    Decide(DecideArgs),
    /// Decide, then monitor the straddle and log each update
    Watch(WatchArgs),
    /// Pick the nearest expiry from a set of option chains
    Nearest(NearestArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Decide(args) => commands::run_decide(&cli.config, args)?,
        Commands::Watch(args) => commands::run_watch(&cli.config, args).await?,
        Commands::Nearest(args) => commands::run_nearest(args).await?,
    }

    Ok(())
}
