use crate::cmd::ScheduleArgs;
use crate::output::{format_time, print_json};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

pub fn run(config: Option<&Path>, args: &ScheduleArgs, count: usize, json: bool) -> Result<()> {
    let now = Utc::now();
    let schedule = args.resolve(config, now)?;
    let fires = schedule.upcoming(now, count);

    if json {
        #[derive(serde::Serialize)]
        struct NextOutput {
            first: DateTime<Utc>,
            interval_ms: u64,
            fires: Vec<DateTime<Utc>>,
        }

        return print_json(&NextOutput {
            first: schedule.first(),
            interval_ms: schedule.interval().as_millis() as u64,
            fires,
        });
    }

    for at in fires {
        println!("{}", format_time(at));
    }
    Ok(())
}
