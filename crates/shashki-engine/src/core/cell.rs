/// Flat index of a board cell: `row * cols + col`.
///
/// Cell ids are stable for the lifetime of a board and are the only currency
/// exchanged with players: a click, a scripted replay entry and a move-tree
/// node all speak cell ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display,
)]
#[display("{_0}")]
pub struct CellId(pub usize);

/// One of the four diagonal directions, as (row, col) unit deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub dr: i8,
    pub dc: i8,
}

impl Direction {
    pub const UP_LEFT: Self = Self { dr: -1, dc: -1 };
    pub const UP_RIGHT: Self = Self { dr: -1, dc: 1 };
    pub const DOWN_LEFT: Self = Self { dr: 1, dc: -1 };
    pub const DOWN_RIGHT: Self = Self { dr: 1, dc: 1 };

    pub const ALL: [Self; 4] = [
        Self::UP_LEFT,
        Self::UP_RIGHT,
        Self::DOWN_LEFT,
        Self::DOWN_RIGHT,
    ];

    /// The reverse direction; banned for the step immediately after a jump so
    /// a chain cannot bounce straight back over the cell it just consumed.
    #[must_use]
    pub fn opposite(self) -> Self {
        Self {
            dr: -self.dr,
            dc: -self.dc,
        }
    }
}
