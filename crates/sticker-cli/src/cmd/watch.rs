use crate::cmd::ScheduleArgs;
use crate::output::{format_time, print_json_line};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sticker::ScheduledTicker;
use std::path::Path;
use tracing::{debug, info};

pub fn run(
    config: Option<&Path>,
    args: &ScheduleArgs,
    count: Option<usize>,
    json: bool,
) -> Result<()> {
    let schedule = args.resolve(config, Utc::now())?;
    info!(
        first = %format_time(schedule.first()),
        next = %format_time(schedule.next_fire()),
        interval_ms = schedule.interval().as_millis() as u64,
        "watching schedule"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut ticker = ScheduledTicker::from_schedule(schedule);
        let mut seq = 0usize;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let result = loop {
            if count.is_some_and(|limit| seq >= limit) {
                break Ok(());
            }
            tokio::select! {
                at = ticker.tick() => {
                    seq += 1;
                    if let Err(e) = print_tick(seq, at, json) {
                        break Err(e);
                    }
                }
                _ = &mut ctrl_c => {
                    debug!("interrupted");
                    break Ok(());
                }
            }
        };

        ticker.stop();
        result
    })
}

fn print_tick(seq: usize, at: DateTime<Utc>, json: bool) -> Result<()> {
    if json {
        #[derive(serde::Serialize)]
        struct TickLine {
            seq: usize,
            at: DateTime<Utc>,
        }
        return print_json_line(&TickLine { seq, at });
    }
    println!("{seq}\t{}", format_time(at));
    Ok(())
}
