use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::pick::PickArgs;
use commands::propose::ProposeArgs;
use commands::sleeves::SleevesArgs;
use commands::stops::StopsArgs;

#[derive(Parser)]
#[command(name = "autopilot")]
#[command(about = "Options autopilot: candidate selection and budget allocation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build trade proposals from directional ideas within budget
    Propose(ProposeArgs),
    /// List positions at or below the stop-loss threshold
    Stops(StopsArgs),
    /// Pick the best contract for one ticker, optionally with diagnostics
    Pick(PickArgs),
    /// Show the sleeve registry or resolve a sleeve list
    Sleeves(SleevesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Propose(args) => commands::propose::run(args).await,
        Commands::Stops(args) => commands::stops::run(args).await,
        Commands::Pick(args) => commands::pick::run(args).await,
        Commands::Sleeves(args) => commands::sleeves::run(args),
    }
}
