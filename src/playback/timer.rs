//! Host timer adapters
//!
//! The controller never sleeps itself. It hands a tick callback to a
//! [`TimerHost`], which calls it about once per [`Cadence`] period until the
//! callback returns `false`. The callback returns `false` as soon as the timer
//! it belongs to has been disarmed, so a stale fire is always a no-op.
//!
//! - [`ThreadTimer`]: one sleeping thread per armed timer
//! - [`ManualTimer`]: fires only when the host says so; for hosts with their
//!   own event loop, and for tests

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Tick callback; returns whether it wants to be called again
pub type TickFn = Box<dyn FnMut() -> bool + Send>;

/// Shared, live-updatable tick period
#[derive(Debug, Clone)]
pub struct Cadence(Arc<AtomicU64>);

impl Cadence {
    pub fn new(interval_ms: u64) -> Self {
        Cadence(Arc::new(AtomicU64::new(interval_ms)))
    }

    pub fn interval_ms(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, interval_ms: u64) {
        self.0.store(interval_ms, Ordering::Release);
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.interval_ms())
    }
}

/// A periodic timer primitive supplied by the host
pub trait TimerHost: Send + Sync {
    /// Start calling `tick` roughly every `cadence.period()` until it returns
    /// `false`. The period is re-read before each wait.
    fn arm(&self, cadence: Cadence, tick: TickFn) -> io::Result<()>;
}

/// Runs each armed timer on its own thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTimer;

impl TimerHost for ThreadTimer {
    fn arm(&self, cadence: Cadence, mut tick: TickFn) -> io::Result<()> {
        thread::Builder::new()
            .name("sortreel-playback".to_string())
            .spawn(move || loop {
                thread::sleep(cadence.period());
                if !tick() {
                    trace!("playback timer thread exiting");
                    break;
                }
            })
            .map(|_| ())
    }
}

/// A timer that only fires when [`ManualTimer::fire`] is called
#[derive(Default)]
pub struct ManualTimer {
    armed: Mutex<Vec<TickFn>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every armed timer once. Returns how many were fired.
    ///
    /// Callbacks run without the internal lock held, so they may arm new
    /// timers; those are first fired on the next call.
    pub fn fire(&self) -> usize {
        let pending = std::mem::take(&mut *self.lock());
        let fired = pending.len();

        let mut survivors: Vec<TickFn> = Vec::with_capacity(fired);
        for mut tick in pending {
            if tick() {
                survivors.push(tick);
            }
        }

        let mut armed = self.lock();
        survivors.append(&mut armed);
        *armed = survivors;
        fired
    }

    /// Fire `times` rounds in a row
    pub fn fire_times(&self, times: usize) {
        for _ in 0..times {
            self.fire();
        }
    }

    /// Timers still holding a callback, stale ones included until they next fire
    pub fn armed(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TickFn>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TimerHost for ManualTimer {
    fn arm(&self, _cadence: Cadence, tick: TickFn) -> io::Result<()> {
        self.lock().push(tick);
        Ok(())
    }
}
