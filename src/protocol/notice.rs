//! Inbound notices from the timer backend

use super::{SlotId, DELIMITER};
use crate::error::ProtocolError;

/// Tag confirming that a slot was cancelled on the backend
pub const CANCEL_DONE: &str = "CANCEL DONE";
/// Tag reporting that a slot's timer fired on the backend
pub const CALLBACK_EXECUTED: &str = "CALLBACK EXECUTED";

const SET_DONE: &str = "SET DONE";
const RESET_DONE: &str = "RESET DONE";

/// A decoded inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The backend cancelled the slot's timer
    CancelDone(SlotId),
    /// The backend's timer for the slot expired and ran its callback
    CallbackExecuted(SlotId),
    /// The backend accepted a SET or RESET; carries no state change
    Acknowledged { verb: &'static str, slot: SlotId },
    /// Anything without a recognized tag
    Unrecognized,
}

impl Notice {
    /// Decode a raw text frame.
    ///
    /// A frame that starts with a known tag must continue with exactly one
    /// delimiter and a valid slot id; anything else after the tag is an error.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        if let Some(slot) = tagged_slot(raw, CANCEL_DONE)? {
            return Ok(Notice::CancelDone(slot));
        }
        if let Some(slot) = tagged_slot(raw, CALLBACK_EXECUTED)? {
            return Ok(Notice::CallbackExecuted(slot));
        }
        for verb in [SET_DONE, RESET_DONE] {
            if let Some(slot) = tagged_slot(raw, verb)? {
                return Ok(Notice::Acknowledged { verb, slot });
            }
        }
        Ok(Notice::Unrecognized)
    }
}

fn tagged_slot(raw: &str, tag: &'static str) -> Result<Option<SlotId>, ProtocolError> {
    let Some(rest) = raw.strip_prefix(tag) else {
        return Ok(None);
    };
    let id = rest
        .strip_prefix(DELIMITER)
        .ok_or(ProtocolError::MissingDelimiter { tag })?;
    id.parse().map(Some)
}
