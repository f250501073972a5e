use std::path::PathBuf;

use anyhow::Result;
use booth_core::BoothConfig;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod prompter;

#[derive(Parser)]
#[command(name = "booth")]
#[command(about = "Pose-controlled game booth session manager")]
struct Cli {
    /// Booth configuration file
    #[arg(short, long, default_value = "booth.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the booth loop (default)
    Run,
    /// Print the current leaderboard and exit
    Leaderboard {
        /// Number of entries to show
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Dump the stored session history as JSON
    History,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("booth_core=info".parse()?)
                .add_directive("booth_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Booth starting...");

    // A present-but-broken config is a startup failure; a missing file
    // just runs on defaults.
    let config = BoothConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run::run(config),
        Command::Leaderboard { top } => commands::leaderboard::run(config, top),
        Command::History => commands::history::run(config),
    }
}
