//! `sticker` — a scheduled ticker for Tokio.
//!
//! Works like [`tokio::time::Interval`], except that the caller picks the
//! point in time of the first tick. Later ticks follow at a fixed interval
//! from that anchor. An anchor in the past is phase-aligned: the ticker fires
//! at whatever point the schedule would have reached had it been running
//! since the anchor.
//!
//! # Architecture
//!
//! ```text
//! ScheduledTicker   ← handle: reset / stop / tick
//!     │                messages only, no shared state
//!     ▼
//! ControlLoop       ← background task, owns every timer
//!     │                pending: one-shot task until the first fire
//!     │                steady:  tokio Interval afterwards
//!     ▼
//! tick channel      ← capacity one, drop-on-full
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use sticker::ScheduledTicker;
//!
//! let first = chrono::Utc::now() + chrono::TimeDelta::hours(1);
//! let mut ticker = ScheduledTicker::new(first, Duration::from_secs(60));
//! let at = ticker.tick().await;
//! ticker.reset(at, Duration::from_secs(30));
//! ticker.stop();
//! ```

pub mod config;
pub mod error;
pub mod schedule;
pub mod ticker;

pub use config::TickerConfig;
pub use error::TickerError;
pub use schedule::{next_fire, next_fire_at, Schedule};
pub use ticker::ScheduledTicker;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, TickerError>;
