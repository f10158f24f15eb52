use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::schedule::Schedule;
use crate::{Result, TickerError};

// ─── ScheduledTicker ──────────────────────────────────────────────────────

/// A ticker like [`tokio::time::Interval`] whose first tick happens at a
/// chosen point in time.
///
/// A background task owns all timer state. [`reset`](Self::reset) and
/// [`stop`](Self::stop) only hand messages to that task. Ticks are delivered
/// through a single-slot channel: if the previous tick has not been consumed
/// yet, the new one is dropped, so a slow reader never stalls the schedule.
///
/// The tick channel is never closed, not even by `stop`. A reader that awaits
/// [`tick`](Self::tick) after stopping simply waits forever.
///
/// ```rust,ignore
/// use sticker::ScheduledTicker;
/// use std::time::Duration;
///
/// let first = chrono::Utc::now() + chrono::TimeDelta::hours(1);
/// let mut ticker = ScheduledTicker::new(first, Duration::from_secs(60));
/// loop {
///     let at = ticker.tick().await;
///     println!("tick at {at}");
/// }
/// ```
pub struct ScheduledTicker {
    ticks: mpsc::Receiver<DateTime<Utc>>,
    // Keeps the tick channel open for as long as the handle exists.
    _ticks_tx: mpsc::Sender<DateTime<Utc>>,
    reset_tx: Option<mpsc::UnboundedSender<Schedule>>,
    stop_tx: watch::Sender<bool>,
}

impl ScheduledTicker {
    /// Start a ticker that first fires at `first` and then every `interval`.
    ///
    /// If `first` lies in the past the ticker fires at the next point of the
    /// `first + k * interval` lattice instead.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero, or when called outside a Tokio runtime.
    pub fn new(first: DateTime<Utc>, interval: Duration) -> Self {
        match Self::try_new(first, interval) {
            Ok(ticker) => ticker,
            Err(e) => panic!("ScheduledTicker::new: {e}"),
        }
    }

    /// Like [`new`](Self::new), but reports a zero interval as an error.
    pub fn try_new(first: DateTime<Utc>, interval: Duration) -> Result<Self> {
        Ok(Self::from_schedule(Schedule::new(first, interval)?))
    }

    /// Start a ticker for an already validated [`Schedule`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn from_schedule(schedule: Schedule) -> Self {
        let (ticks_tx, ticks_rx) = mpsc::channel(1);
        let (reset_tx, reset_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);

        let control = ControlLoop::new(ticks_tx.clone(), reset_rx, stop_rx);
        tokio::spawn(control.run());

        // The loop is alive and holds the receiver, so this cannot fail.
        let _ = reset_tx.send(schedule);

        ScheduledTicker {
            ticks: ticks_rx,
            _ticks_tx: ticks_tx,
            reset_tx: Some(reset_tx),
            stop_tx,
        }
    }

    /// Restart the schedule: the next tick arrives at `first` (or the next
    /// lattice point after now) and then every `interval`.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero or the ticker has been stopped.
    pub fn reset(&self, first: DateTime<Utc>, interval: Duration) {
        if let Err(e) = self.try_reset(first, interval) {
            panic!("ScheduledTicker::reset: {e}");
        }
    }

    /// Like [`reset`](Self::reset), but reports a zero interval as
    /// [`TickerError::NonPositiveInterval`] and a stopped ticker as
    /// [`TickerError::Stopped`]. The interval is checked first.
    pub fn try_reset(&self, first: DateTime<Utc>, interval: Duration) -> Result<()> {
        self.reset_schedule(Schedule::new(first, interval)?)
    }

    /// Restart with an already validated [`Schedule`]. Returns
    /// [`TickerError::Stopped`] once [`stop`](Self::stop) has been called.
    pub fn reset_schedule(&self, schedule: Schedule) -> Result<()> {
        let tx = self.reset_tx.as_ref().ok_or(TickerError::Stopped)?;
        tx.send(schedule).map_err(|_| TickerError::Stopped)
    }

    /// Turn the ticker off. No tick is delivered after this returns, except
    /// one that was already in flight on another worker.
    ///
    /// The tick channel stays open; stopping twice has no further effect.
    pub fn stop(&mut self) {
        if self.reset_tx.take().is_some() {
            self.stop_tx.send_replace(true);
        }
    }

    /// Whether [`stop`](Self::stop) has been called, explicitly or by drop.
    /// Always `true` after the first stop; further calls change nothing.
    pub fn is_stopped(&self) -> bool {
        self.reset_tx.is_none()
    }

    /// Wait for the next delivered tick.
    pub async fn tick(&mut self) -> DateTime<Utc> {
        match self.ticks.recv().await {
            Some(at) => at,
            // Unreachable while `_ticks_tx` lives; behave like a silent channel.
            None => std::future::pending().await,
        }
    }

    /// Take the buffered tick, if any, without waiting.
    pub fn try_tick(&mut self) -> Option<DateTime<Utc>> {
        self.ticks.try_recv().ok()
    }
}

impl Stream for ScheduledTicker {
    type Item = DateTime<Utc>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.ticks.poll_recv(cx)
    }
}

impl Drop for ScheduledTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── ControlLoop ──────────────────────────────────────────────────────────

/// Steady interval built by a fired one-shot, tagged with the configuration
/// it belongs to.
struct Armed {
    generation: u64,
    interval: Interval,
}

/// Sole owner of the timer state. Runs until stopped or until the handle is
/// dropped.
///
/// Pending phase: a spawned one-shot task sleeps until the first fire time,
/// delivers the first tick and sends the freshly built [`Interval`] back over
/// `armed_tx`. Steady phase: the loop itself polls that interval.
struct ControlLoop {
    ticks: mpsc::Sender<DateTime<Utc>>,
    resets: mpsc::UnboundedReceiver<Schedule>,
    stop: watch::Receiver<bool>,
    armed_tx: mpsc::UnboundedSender<Armed>,
    armed_rx: mpsc::UnboundedReceiver<Armed>,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    steady: Option<Interval>,
}

impl ControlLoop {
    fn new(
        ticks: mpsc::Sender<DateTime<Utc>>,
        resets: mpsc::UnboundedReceiver<Schedule>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let (armed_tx, armed_rx) = mpsc::unbounded_channel();
        Self {
            ticks,
            resets,
            stop,
            armed_tx,
            armed_rx,
            generation: 0,
            pending: None,
            steady: None,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                _ = self.stop.changed() => {
                    debug!(generation = self.generation, "ticker stopped");
                    break;
                }
                reset = self.resets.recv() => match reset {
                    Some(schedule) => self.arm(schedule),
                    None => break,
                },
                Some(armed) = self.armed_rx.recv() => self.adopt(armed),
                _ = steady_tick(&mut self.steady) => deliver(&self.ticks, Utc::now()),
            }
        }
        self.disarm();
    }

    /// Enter the pending phase for `schedule`, discarding any timer from the
    /// previous configuration.
    fn arm(&mut self, schedule: Schedule) {
        self.disarm();
        self.generation += 1;

        let generation = self.generation;
        let period = schedule.interval();
        let first_fire = schedule.next_fire();
        let delay = (first_fire - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        debug!(
            generation,
            first_fire = %first_fire,
            delay_ms = delay.as_millis() as u64,
            period_ms = period.as_millis() as u64,
            "arming one-shot"
        );

        let ticks = self.ticks.clone();
        let stop = self.stop.clone();
        let armed_tx = self.armed_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            if *stop.borrow() {
                return;
            }
            deliver(&ticks, Utc::now());

            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let _ = armed_tx.send(Armed {
                generation,
                interval,
            });
        }));
    }

    /// Switch to the steady phase, unless `armed` belongs to a superseded
    /// configuration.
    fn adopt(&mut self, armed: Armed) {
        if armed.generation != self.generation {
            trace!(
                stale = armed.generation,
                current = self.generation,
                "discarding stale interval"
            );
            return;
        }
        debug!(generation = self.generation, "steady interval adopted");
        self.pending = None;
        self.steady = Some(armed.interval);
    }

    fn disarm(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.steady = None;
    }
}

async fn steady_tick(steady: &mut Option<Interval>) -> Instant {
    match steady {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

/// Offer `at` to the reader without waiting; a full slot drops the tick.
fn deliver(ticks: &mpsc::Sender<DateTime<Utc>>, at: DateTime<Utc>) {
    match ticks.try_send(at) {
        Ok(()) => trace!(at = %at, "tick delivered"),
        Err(TrySendError::Full(_)) => trace!(at = %at, "tick dropped, reader is behind"),
        Err(TrySendError::Closed(_)) => {}
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
