//! Timed playback of a generated trace
//!
//! [`PlaybackController`] owns one playback session: the loaded trace, the
//! [`PlaybackState`], the subscriber list and the identity of the armed timer.
//! All of it sits behind a single mutex, and every transition goes through
//! [`reduce`], so reads and writes of step, status and interval are never torn.
//!
//! # Single-flight timers
//!
//! Each arm or disarm bumps a timer epoch. A tick callback carries the epoch
//! it was armed with and bails out (asking its host to stop) once the epoch
//! has moved on. At most one callback can therefore advance the session, and
//! a fire already queued when `pause`, `reset` or completion happens emits
//! nothing.
//!
//! # Delivery
//!
//! Subscribers are called after the lock is released, so they may call back
//! into the controller. A panicking subscriber is logged and skipped; the
//! step and the timer are unaffected.

use super::state::{reduce, Effect, Event, PlaybackState, Status};
use super::timer::{Cadence, ThreadTimer, TickFn, TimerHost};
use crate::config::PlaybackConfig;
use crate::trace::Trace;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Callback receiving `(step_index, snapshot)` on every step change
pub type Subscriber<T> = Arc<dyn Fn(usize, &[T]) + Send + Sync>;

/// Position within the loaded trace, e.g. "step 3 of 7"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub step: usize,
    pub last: usize,
}

impl Progress {
    /// Share of the trace played so far, in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.last == 0 {
            0.0
        } else {
            self.step as f64 / self.last as f64
        }
    }
}

struct Session<T> {
    state: PlaybackState,
    trace: Option<Arc<Trace<T>>>,
    timer_epoch: u64,
    subscribers: Vec<(u64, Subscriber<T>)>,
    next_subscriber_id: u64,
}

impl<T> Session<T> {
    fn delivery(&self, step: usize) -> Option<Delivery<T>> {
        let trace = self.trace.as_ref()?;
        Some(Delivery {
            step,
            trace: Arc::clone(trace),
            subscribers: self.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect(),
        })
    }
}

/// One step's worth of notifications, sent outside the lock
struct Delivery<T> {
    step: usize,
    trace: Arc<Trace<T>>,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Delivery<T> {
    fn send(self) {
        let Some(snapshot) = self.trace.get(self.step) else {
            return;
        };
        for subscriber in &self.subscribers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| subscriber(self.step, snapshot)));
            if outcome.is_err() {
                warn!(step = self.step, "playback subscriber panicked; continuing");
            }
        }
    }
}

fn lock<T>(session: &Mutex<Session<T>>) -> MutexGuard<'_, Session<T>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by [`PlaybackController::subscribe`]
#[must_use = "call unsubscribe() to stop receiving steps"]
pub struct Subscription {
    cancel: Box<dyn FnOnce() + Send>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        (self.cancel)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Replays a trace one snapshot per tick
pub struct PlaybackController<T> {
    session: Arc<Mutex<Session<T>>>,
    cadence: Cadence,
    timer: Arc<dyn TimerHost>,
}

impl<T: Send + Sync + 'static> PlaybackController<T> {
    /// Controller ticking on background threads
    pub fn new(config: PlaybackConfig) -> Self {
        Self::with_timer(config, Arc::new(ThreadTimer))
    }

    /// Controller ticking on a host-provided timer
    pub fn with_timer(config: PlaybackConfig, timer: Arc<dyn TimerHost>) -> Self {
        let state = PlaybackState::new(config.interval_ms);
        PlaybackController {
            cadence: Cadence::new(state.interval_ms),
            session: Arc::new(Mutex::new(Session {
                state,
                trace: None,
                timer_epoch: 0,
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            })),
            timer,
        }
    }

    /// Replace the current trace; back to `Idle` at step 0
    pub fn load(&self, trace: Trace<T>) {
        self.load_shared(Arc::new(trace));
    }

    pub fn load_shared(&self, trace: Arc<Trace<T>>) {
        let mut session = lock(&self.session);
        let len = trace.len();
        session.trace = Some(trace);
        self.apply(session, Event::Load { len });
    }

    /// Begin or resume playback. A no-op while running, when finished, or
    /// with no trace loaded.
    pub fn start(&self, interval_ms: Option<u64>) {
        self.dispatch(Event::Start { interval_ms });
    }

    pub fn pause(&self) {
        self.dispatch(Event::Pause);
    }

    /// Drop the trace and return to `Idle`
    pub fn reset(&self) {
        let mut session = lock(&self.session);
        session.trace = None;
        self.apply(session, Event::Reset);
    }

    /// Change the cadence; the next wait already uses it
    pub fn set_interval_ms(&self, ms: u64) {
        self.dispatch(Event::SetInterval { ms });
    }

    /// Advance one step by hand while not running
    pub fn step_forward(&self) {
        self.dispatch(Event::StepForward);
    }

    /// Go back one step by hand while not running
    pub fn step_backward(&self) {
        self.dispatch(Event::StepBackward);
    }

    /// Register a step listener
    pub fn subscribe<F>(&self, on_tick: F) -> Subscription
    where
        F: Fn(usize, &[T]) + Send + Sync + 'static,
    {
        let subscriber: Subscriber<T> = Arc::new(on_tick);
        let mut session = lock(&self.session);
        let id = session.next_subscriber_id;
        session.next_subscriber_id += 1;
        session.subscribers.push((id, subscriber));

        let weak = Arc::downgrade(&self.session);
        Subscription {
            cancel: Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    lock(&shared).subscribers.retain(|(sid, _)| *sid != id);
                }
            }),
        }
    }

    pub fn current_step(&self) -> usize {
        lock(&self.session).state.step_index
    }

    pub fn status(&self) -> Status {
        lock(&self.session).state.status
    }

    pub fn interval_ms(&self) -> u64 {
        lock(&self.session).state.interval_ms
    }

    pub fn state(&self) -> PlaybackState {
        lock(&self.session).state
    }

    /// None when no trace is loaded
    pub fn progress(&self) -> Option<Progress> {
        let session = lock(&self.session);
        session.state.last_step().map(|last| Progress {
            step: session.state.step_index,
            last,
        })
    }

    pub fn trace(&self) -> Option<Arc<Trace<T>>> {
        lock(&self.session).trace.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.session).subscribers.len()
    }

    /// The snapshot at the current step
    pub fn current_snapshot(&self) -> Option<Vec<T>>
    where
        T: Clone,
    {
        let session = lock(&self.session);
        let trace = session.trace.as_ref()?;
        trace.get(session.state.step_index).map(<[T]>::to_vec)
    }

    /// Block until playback leaves `Running`, polling every `poll`.
    ///
    /// Returns the status it stopped in; `Completed` unless playback was
    /// paused, reset or never got going.
    pub fn wait_while_running(&self, poll: Duration) -> Status {
        loop {
            let status = self.status();
            if status != Status::Running {
                return status;
            }
            thread::sleep(poll);
        }
    }

    fn dispatch(&self, event: Event) {
        let session = lock(&self.session);
        self.apply(session, event);
    }

    fn apply(&self, mut session: MutexGuard<'_, Session<T>>, event: Event) {
        let (next, effect) = reduce(session.state, event);
        session.state = next;
        self.cadence.set(next.interval_ms);

        match effect {
            Effect::None => {}
            Effect::Disarm => session.timer_epoch += 1,
            Effect::Arm => {
                session.timer_epoch += 1;
                let epoch = session.timer_epoch;
                // The host may tick before arm() returns
                drop(session);
                self.arm(epoch);
            }
            Effect::Emit(step) => {
                let delivery = session.delivery(step);
                drop(session);
                if let Some(delivery) = delivery {
                    delivery.send();
                }
            }
        }
    }

    /// Hand a tick callback for `epoch` to the host. Called without the lock.
    fn arm(&self, epoch: u64) {
        let weak = Arc::downgrade(&self.session);
        let tick: TickFn = Box::new(move || Self::on_tick(&weak, epoch));

        if let Err(err) = self.timer.arm(self.cadence.clone(), tick) {
            let mut session = lock(&self.session);
            // A pause, reset or load in the meantime already moved on
            if session.timer_epoch != epoch {
                return;
            }
            warn!(%err, "failed to arm playback timer; pausing");
            session.state = reduce(session.state, Event::Pause).0;
            session.timer_epoch += 1;
            return;
        }
        debug!(epoch, interval_ms = self.cadence.interval_ms(), "playback timer armed");
    }

    /// Timer callback; returns whether this timer should keep firing
    fn on_tick(session: &Weak<Mutex<Session<T>>>, epoch: u64) -> bool {
        let Some(shared) = session.upgrade() else {
            return false;
        };
        let mut session = lock(&shared);
        if session.timer_epoch != epoch {
            return false;
        }

        let (next, effect) = reduce(session.state, Event::Tick);
        session.state = next;
        match effect {
            Effect::Emit(step) => {
                trace!(step, "playback tick");
                let delivery = session.delivery(step);
                drop(session);
                if let Some(delivery) = delivery {
                    delivery.send();
                }
                true
            }
            Effect::Disarm => {
                session.timer_epoch += 1;
                debug!(step = next.step_index, "playback completed");
                false
            }
            Effect::None | Effect::Arm => false,
        }
    }
}

impl<T: Send + Sync + 'static> Default for PlaybackController<T> {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl<T> fmt::Debug for PlaybackController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = lock(&self.session);
        f.debug_struct("PlaybackController")
            .field("state", &session.state)
            .field("subscribers", &session.subscribers.len())
            .finish_non_exhaustive()
    }
}
