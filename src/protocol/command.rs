//! Outbound commands

use std::fmt;

use super::{SlotId, DELIMITER};

/// A command sent to the timer backend
///
/// The wire form always carries exactly two delimiters, so a cancel ends
/// with a trailing `:` and no seconds field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Set { slot: SlotId, seconds: u64 },
    Cancel { slot: SlotId },
    Reset { slot: SlotId, seconds: u64 },
}

impl Command {
    pub fn slot(&self) -> SlotId {
        match *self {
            Command::Set { slot, .. }
            | Command::Cancel { slot }
            | Command::Reset { slot, .. } => slot,
        }
    }

    /// Verb as it appears at the start of the frame
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Cancel { .. } => "CANCEL",
            Command::Reset { .. } => "RESET",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.verb(), DELIMITER, self.slot(), DELIMITER)?;
        match self {
            Command::Set { seconds, .. } | Command::Reset { seconds, .. } => {
                write!(f, "{}", seconds)
            }
            Command::Cancel { .. } => Ok(()),
        }
    }
}
