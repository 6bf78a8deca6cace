//! Error types shared across the crate

use thiserror::Error;

use crate::protocol::SlotId;

/// Failure to decode an inbound frame that carries a recognized tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("expected ':' after tag {tag:?}")]
    MissingDelimiter { tag: &'static str },

    #[error("invalid slot id {0:?}")]
    InvalidSlot(String),
}

/// Failure of a user action against the session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no such slot: {0}")]
    UnknownSlot(usize),

    #[error("set is disabled for slot {0} until the backend confirms")]
    SetDisabled(SlotId),

    #[error("not connected to the timer backend")]
    Disconnected,
}
