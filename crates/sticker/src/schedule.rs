use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{Result, TickerError};

const NANOS_PER_SEC: i128 = 1_000_000_000;

// ─── Schedule ─────────────────────────────────────────────────────────────

/// An anchor point plus the period that follows it.
///
/// The fire times of a schedule form the lattice
/// `first, first + interval, first + 2 * interval, …`. The anchor may lie in
/// the past; the ticker then joins the lattice at the next point after now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    first: DateTime<Utc>,
    interval: Duration,
}

impl Schedule {
    /// Build a schedule, rejecting a zero interval.
    pub fn new(first: DateTime<Utc>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(TickerError::NonPositiveInterval);
        }
        Ok(Self { first, interval })
    }

    pub fn first(&self) -> DateTime<Utc> {
        self.first
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The next fire time as seen from the current wall clock.
    pub fn next_fire(&self) -> DateTime<Utc> {
        next_fire(self.first, self.interval)
    }

    pub fn next_fire_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_fire_at(self.first, self.interval, now)
    }

    /// The next `count` fire times after `now`, in order.
    pub fn upcoming(&self, now: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let step = interval_nanos(self.interval);
        let start = self.next_fire_at(now);
        (0..count)
            .map(|k| add_nanos(start, step.saturating_mul(k as i128)))
            .collect()
    }
}

// ─── Next-fire calculator ─────────────────────────────────────────────────

/// Compute when a schedule anchored at `first` fires next, relative to now.
///
/// See [`next_fire_at`] for the exact rule.
///
/// # Panics
///
/// Panics if `interval` is zero.
pub fn next_fire(first: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    next_fire_at(first, interval, Utc::now())
}

/// Compute when a schedule anchored at `first` fires next, relative to `now`.
///
/// A future anchor is returned unchanged. Otherwise the result is the first
/// lattice point strictly after `now`: `first + (floor(elapsed / interval) + 1) * interval`.
/// A `now` that lands exactly on the lattice therefore yields the following point.
///
/// Results past the end of chrono's range saturate at [`DateTime::<Utc>::MAX_UTC`].
///
/// # Panics
///
/// Panics if `interval` is zero.
pub fn next_fire_at(
    first: DateTime<Utc>,
    interval: Duration,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    assert!(!interval.is_zero(), "next_fire_at: non-positive interval");
    if now < first {
        return first;
    }

    let step = interval_nanos(interval);
    let elapsed = now - first;
    let elapsed_ns =
        i128::from(elapsed.num_seconds()) * NANOS_PER_SEC + i128::from(elapsed.subsec_nanos());

    let past_iterations = elapsed_ns / step;
    add_nanos(first, (past_iterations + 1).saturating_mul(step))
}

fn interval_nanos(interval: Duration) -> i128 {
    i128::try_from(interval.as_nanos()).unwrap_or(i128::MAX)
}

fn add_nanos(at: DateTime<Utc>, nanos: i128) -> DateTime<Utc> {
    let secs = i64::try_from(nanos / NANOS_PER_SEC).ok();
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    secs.and_then(|s| TimeDelta::new(s, subsec))
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ─── Tests ────────────────────────────────────────────────────────────────
