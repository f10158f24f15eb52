pub mod next;
pub mod watch;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use sticker::{Schedule, TickerConfig};
use std::path::Path;

/// Schedule flags shared by every subcommand. Flags override the config file.
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// First tick as RFC 3339 (default: from config, else now)
    #[arg(long)]
    pub first: Option<DateTime<Utc>>,

    /// Interval between ticks in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

impl ScheduleArgs {
    pub fn resolve(&self, config: Option<&Path>, now: DateTime<Utc>) -> Result<Schedule> {
        let mut cfg = match config {
            Some(path) => TickerConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => match self.interval_ms {
                Some(ms) => TickerConfig {
                    first: None,
                    interval_ms: ms,
                },
                None => bail!("--interval-ms is required when no --config is given"),
            },
        };

        if let Some(first) = self.first {
            cfg.first = Some(first);
        }
        if let Some(ms) = self.interval_ms {
            cfg.interval_ms = ms;
        }

        cfg.schedule(now).context("invalid schedule")
    }
}
