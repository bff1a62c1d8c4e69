//! Organ identity: which side of a pair, and which organ emitted something.

use serde::{Deserialize, Serialize};

/// One half of a paired organ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Slot of this side in a `[_; 2]` array.
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Source or target of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organ {
    Cavity,
    Sphincter,
    Duct(Side),
    Gland(Side),
}
