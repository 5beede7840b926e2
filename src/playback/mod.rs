//! Trace playback
//!
//! This module turns a finished [`crate::trace::Trace`] into a timed sequence
//! of step notifications:
//! - [`state`]: the pure `(PlaybackState, Event) -> (PlaybackState, Effect)`
//!   reducer
//! - [`timer`]: adapters that turn a host's periodic timer into tick events
//! - [`controller`]: the session object tying trace, reducer, timer and
//!   subscribers together
//!
//! Playback operations are total. Calls that make no sense in the current
//! state (pausing while idle, starting while running) do nothing.

pub mod controller;
pub mod state;
pub mod timer;

pub use controller::{PlaybackController, Progress, Subscriber, Subscription};
pub use state::{reduce, Effect, Event, PlaybackState, Status};
pub use timer::{Cadence, ManualTimer, ThreadTimer, TimerHost};
