use serde::{Deserialize, Serialize};

/// A single grid position: its value, visibility, and flag marker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// `-1` marks a mine, otherwise the count of adjacent mines (0-8).
    pub value: i8,
    /// True until the cell is revealed.
    pub hidden: bool,
    /// Player-toggled marker, independent of `hidden`.
    pub flag: bool,
}

impl Cell {
    pub const MINE: i8 = -1;

    pub const fn is_mine(&self) -> bool {
        self.value == Self::MINE
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            value: 0,
            hidden: true,
            flag: false,
        }
    }
}
