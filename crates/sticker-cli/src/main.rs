mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::ScheduleArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sticker",
    about = "Scheduled ticker — compute and watch ticks anchored at a point in time",
    version,
    propagate_version = true
)]
struct Cli {
    /// YAML schedule file (first, interval_ms)
    #[arg(long, global = true, env = "STICKER_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the upcoming fire times of a schedule
    Next {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Number of fire times to print
        #[arg(long, default_value = "1")]
        count: usize,
    },

    /// Run a ticker and print each tick as it arrives
    Watch {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long)]
        count: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    let result = match &cli.command {
        Commands::Next { schedule, count } => cmd::next::run(config, schedule, *count, cli.json),
        Commands::Watch { schedule, count } => cmd::watch::run(config, schedule, *count, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
