//! Wire protocol spoken with the timer backend
//!
//! Outbound frames are plain-text commands (`SET:<i>:<s>`, `CANCEL:<i>:`,
//! `RESET:<i>:<s>`); inbound frames are free text, a few of which carry a
//! recognized tag followed by `:` and a slot id.

pub mod command;
pub mod notice;
pub mod slot_id;

pub use command::Command;
pub use notice::Notice;
pub use slot_id::{SlotId, SLOT_COUNT};

/// Separator between fields of every frame
pub const DELIMITER: char = ':';
