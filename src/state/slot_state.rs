//! Per-slot countdown state

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{protocol::SlotId, tasks::CountdownHandle};

/// Interval between local countdown ticks, in milliseconds
pub const TICK_MS: i64 = 100;

/// Status label shown for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    NotActive,
    Active,
    /// Countdown running, rendered as `<n>ms`
    Remaining(i64),
    Expiring,
    CallbackExecuted,
}

impl DisplayState {
    /// Whether the backend has already concluded this slot
    pub fn is_concluded(self) -> bool {
        matches!(self, DisplayState::NotActive | DisplayState::CallbackExecuted)
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayState::NotActive => f.write_str("NOT ACTIVE"),
            DisplayState::Active => f.write_str("ACTIVE"),
            DisplayState::Remaining(ms) => write!(f, "{}ms", ms),
            DisplayState::Expiring => f.write_str("EXPIRING"),
            DisplayState::CallbackExecuted => f.write_str("CALLBACK EXECUTED"),
        }
    }
}

impl Serialize for DisplayState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

/// One of the five countdown slots
#[derive(Debug)]
pub struct TimerSlot {
    id: SlotId,
    display: DisplayState,
    remaining_ms: i64,
    /// Seconds the slot was last armed with, shown back in its input
    seconds: Option<u64>,
    set_enabled: bool,
    generation: u64,
    countdown: Option<CountdownHandle>,
}

/// Serializable view of a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSnapshot {
    pub id: SlotId,
    pub status: DisplayState,
    pub remaining_ms: i64,
    pub seconds: Option<u64>,
    pub set_enabled: bool,
    pub counting: bool,
}

impl TimerSlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            display: DisplayState::NotActive,
            remaining_ms: 0,
            seconds: None,
            set_enabled: true,
            generation: 0,
            countdown: None,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn display(&self) -> DisplayState {
        self.display
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    pub fn set_enabled(&self) -> bool {
        self.set_enabled
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a countdown task is registered for this slot
    pub fn is_counting(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn remember_seconds(&mut self, seconds: u64) {
        self.seconds = Some(seconds);
    }

    pub fn disable_set(&mut self) {
        self.set_enabled = false;
    }

    /// Reset the slot for a fresh countdown and return its generation.
    ///
    /// Any registered countdown is cancelled first; the caller attaches the
    /// new one with [`TimerSlot::attach_countdown`].
    pub fn begin_countdown(&mut self, remaining_ms: i64) -> u64 {
        self.stop_countdown();
        self.generation += 1;
        self.remaining_ms = remaining_ms;
        self.display = DisplayState::Active;
        self.generation
    }

    pub fn attach_countdown(&mut self, handle: CountdownHandle) {
        if let Some(stale) = self.countdown.replace(handle) {
            stale.cancel();
        }
    }

    /// Cancel the registered countdown, if any
    pub fn stop_countdown(&mut self) -> bool {
        match self.countdown.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Advance the local countdown by one tick.
    ///
    /// Ticks from a superseded generation are ignored. A countdown never
    /// renders a negative value: the tick that crosses zero lands on
    /// `EXPIRING` instead.
    pub fn tick(&mut self, generation: u64) -> Tick {
        if generation != self.generation {
            return Tick::Stop;
        }
        if self.display.is_concluded() {
            self.countdown = None;
            return Tick::Stop;
        }

        self.remaining_ms -= TICK_MS;
        if self.remaining_ms < 0 {
            self.display = DisplayState::Expiring;
            self.countdown = None;
            Tick::Stop
        } else {
            self.display = DisplayState::Remaining(self.remaining_ms);
            Tick::Continue
        }
    }

    pub fn confirm_cancelled(&mut self) {
        self.display = DisplayState::NotActive;
        self.set_enabled = true;
    }

    pub fn confirm_executed(&mut self) {
        self.display = DisplayState::CallbackExecuted;
        self.set_enabled = true;
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id,
            status: self.display,
            remaining_ms: self.remaining_ms,
            seconds: self.seconds,
            set_enabled: self.set_enabled,
            counting: self.is_counting(),
        }
    }
}
