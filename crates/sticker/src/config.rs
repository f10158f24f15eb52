use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;
use crate::Result;

/// On-disk description of a ticker schedule.
///
/// ```yaml
/// first: 2024-01-01T00:00:00Z   # optional, defaults to "now"
/// interval_ms: 60000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<DateTime<Utc>>,
    pub interval_ms: u64,
}

impl TickerConfig {
    pub fn new(first: Option<DateTime<Utc>>, interval: Duration) -> Self {
        Self {
            first,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Resolve into a validated [`Schedule`], anchoring at `now` when no
    /// `first` is configured.
    pub fn schedule(&self, now: DateTime<Utc>) -> Result<Schedule> {
        Schedule::new(self.first.unwrap_or(now), self.interval())
    }
}
