//! Playback state machine
//!
//! [`reduce`] maps `(PlaybackState, Event)` to the next state plus the one
//! [`Effect`] the host must carry out. It has no clock, no trace and no
//! subscribers, so every transition can be tested on its own.
//!
//! ```text
//!            load / reset (from any state)
//!                    |
//!                    v
//!   +-------+  start  +---------+  tick at last step  +-----------+
//!   | Idle  | ------> | Running | ------------------> | Completed |
//!   +-------+         +---------+                     +-----------+
//!                      |     ^
//!                pause |     | start
//!                      v     |
//!                    +--------+
//!                    | Paused |
//!                    +--------+
//! ```

use crate::config::clamp_interval_ms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// No trace loaded, or loaded but not yet started
    Idle,
    /// Timer armed, advancing one step per tick
    Running,
    /// Timer disarmed, step retained
    Paused,
    /// Last step reached, timer disarmed
    Completed,
}

/// Everything the controller knows about a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub step_index: usize,
    pub status: Status,
    pub interval_ms: u64,
    /// Snapshots in the loaded trace; zero when none is loaded
    pub trace_len: usize,
}

impl PlaybackState {
    pub fn new(interval_ms: u64) -> Self {
        PlaybackState {
            step_index: 0,
            status: Status::Idle,
            interval_ms: clamp_interval_ms(interval_ms),
            trace_len: 0,
        }
    }

    pub fn has_trace(&self) -> bool {
        self.trace_len > 0
    }

    /// Index of the final step, if a trace is loaded
    pub fn last_step(&self) -> Option<usize> {
        self.trace_len.checked_sub(1)
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Load { len: usize },
    Start { interval_ms: Option<u64> },
    Tick,
    Pause,
    Reset,
    SetInterval { ms: u64 },
    StepForward,
    StepBackward,
}

/// What the host has to do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Arm a fresh periodic timer
    Arm,
    /// Disarm whatever timer is armed
    Disarm,
    /// Deliver the snapshot at this step to subscribers
    Emit(usize),
}

/// Compute the next state. Invalid events leave the state as it was.
pub fn reduce(state: PlaybackState, event: Event) -> (PlaybackState, Effect) {
    use Status::*;

    match event {
        Event::Load { len } => (
            PlaybackState {
                step_index: 0,
                status: Idle,
                trace_len: len,
                ..state
            },
            Effect::Disarm,
        ),

        Event::Reset => (
            PlaybackState {
                step_index: 0,
                status: Idle,
                trace_len: 0,
                ..state
            },
            Effect::Disarm,
        ),

        Event::Start { interval_ms } => match state.status {
            Idle | Paused if state.has_trace() => (
                PlaybackState {
                    status: Running,
                    interval_ms: interval_ms.map_or(state.interval_ms, clamp_interval_ms),
                    ..state
                },
                Effect::Arm,
            ),
            _ => (state, Effect::None),
        },

        Event::Tick => match (state.status, state.last_step()) {
            (Running, Some(last)) if state.step_index < last => {
                let step_index = state.step_index + 1;
                (PlaybackState { step_index, ..state }, Effect::Emit(step_index))
            }
            (Running, _) => (
                PlaybackState {
                    status: Completed,
                    ..state
                },
                Effect::Disarm,
            ),
            // A fire from a timer that was already disarmed
            _ => (state, Effect::None),
        },

        Event::Pause => match state.status {
            Running => (
                PlaybackState {
                    status: Paused,
                    ..state
                },
                Effect::Disarm,
            ),
            _ => (state, Effect::None),
        },

        Event::SetInterval { ms } => (
            PlaybackState {
                interval_ms: clamp_interval_ms(ms),
                ..state
            },
            Effect::None,
        ),

        Event::StepForward => match (state.status, state.last_step()) {
            (Idle | Paused, Some(last)) if state.step_index < last => {
                let step_index = state.step_index + 1;
                (PlaybackState { step_index, ..state }, Effect::Emit(step_index))
            }
            _ => (state, Effect::None),
        },

        Event::StepBackward => match state.status {
            Idle | Paused | Completed if state.step_index > 0 => {
                let step_index = state.step_index - 1;
                // Leaving the last step makes a finished session resumable
                let status = if state.status == Completed {
                    Paused
                } else {
                    state.status
                };
                (
                    PlaybackState {
                        step_index,
                        status,
                        ..state
                    },
                    Effect::Emit(step_index),
                )
            }
            _ => (state, Effect::None),
        },
    }
}
