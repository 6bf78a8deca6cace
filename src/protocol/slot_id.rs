//! Validated slot index

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::ProtocolError;

/// Number of independently addressable countdown slots
pub const SLOT_COUNT: usize = 5;

/// Index of one of the countdown slots, always in `0..SLOT_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SlotId(u8);

impl SlotId {
    /// Build a slot id from an index, rejecting anything out of range
    pub fn new(index: usize) -> Option<Self> {
        if index < SLOT_COUNT {
            u8::try_from(index).ok().map(Self)
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// All slot ids in ascending order
    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..SLOT_COUNT).filter_map(SlotId::new)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SlotId {
    type Err = ProtocolError;

    /// Parse plain decimal text: no sign, no whitespace, no leading zeros
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidSlot(s.to_string());

        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.len() > 1 && s.starts_with('0') {
            return Err(invalid());
        }

        s.parse::<usize>()
            .ok()
            .and_then(SlotId::new)
            .ok_or_else(invalid)
    }
}
