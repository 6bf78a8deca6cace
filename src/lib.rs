//! Timer Panel - A control panel for a WebSocket timer backend
//!
//! This library holds one connection to the backend, drives five countdown
//! slots with cosmetic local countdowns, and serves the panel over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{ProtocolError, SessionError};
pub use state::Session;
pub use utils::signals::shutdown_signal;
