use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two display positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::Left, Slot::Right];

    pub fn sibling(self) -> Slot {
        match self {
            Slot::Left => Slot::Right,
            Slot::Right => Slot::Left,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Left => write!(f, "left"),
            Slot::Right => write!(f, "right"),
        }
    }
}
