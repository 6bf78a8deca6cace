//! Background tasks module
//!
//! This module contains the connection task and the per-slot countdown tasks
//! that run alongside the panel server.

pub mod connection;
pub mod countdown;

// Re-export main items
pub use connection::connection_task;
pub use countdown::{spawn_countdown, CountdownHandle};
