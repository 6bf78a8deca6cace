//! State management module
//!
//! This module contains the session context and the per-slot and log state it owns.

pub mod log_state;
pub mod session;
pub mod slot_state;

// Re-export main types
pub use log_state::{LogEntry, LogPanel, LogStyle, LOG_CAPACITY};
pub use session::{ConnectionState, PanelSnapshot, Session};
pub use slot_state::{DisplayState, SlotSnapshot, Tick, TimerSlot, TICK_MS};
