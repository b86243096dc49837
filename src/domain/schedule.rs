//! Externally driven evaluation cycles.
//!
//! The core never schedules itself. A [`Ticker`] decides when the next cycle
//! starts and a [`CancellationToken`] stops the loop between cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

pub const MIN_REFRESH_SECS: u64 = 10;
pub const MAX_REFRESH_SECS: u64 = 180;
pub const DEFAULT_REFRESH_SECS: u64 = 60;

/// How often a sleeping ticker re-checks for cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Ticker {
    /// Block until the next cycle is due. Returns false if cancelled while waiting.
    fn wait_next(&mut self, token: &CancellationToken) -> bool;
}

/// Sleeps a fixed interval between cycles; the first cycle starts immediately.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Duration,
    started: bool,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started: false,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Ticker for IntervalTicker {
    fn wait_next(&mut self, token: &CancellationToken) -> bool {
        if !self.started {
            self.started = true;
            return !token.is_cancelled();
        }
        let deadline = Instant::now() + self.interval;
        loop {
            if token.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(CANCEL_POLL.min(deadline - now));
        }
    }
}

pub fn refresh_interval_in_range(secs: u64) -> bool {
    (MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&secs)
}

/// Run `cycle` once per tick until cancelled or `max_cycles` is reached.
/// Returns the number of completed cycles.
pub fn run_cycles<T, F>(
    ticker: &mut T,
    token: &CancellationToken,
    max_cycles: Option<u64>,
    mut cycle: F,
) -> u64
where
    T: Ticker,
    F: FnMut(u64),
{
    let mut completed = 0;
    while max_cycles.is_none_or(|max| completed < max) {
        if !ticker.wait_next(token) || token.is_cancelled() {
            tracing::info!(completed, "evaluation loop cancelled");
            break;
        }
        cycle(completed);
        completed += 1;
    }
    completed
}
