use crate::core::cell::CellId;

/// Side of a piece or player. White sits on the bottom rows of the standard
/// layout and moves toward row 0; Black sits on top and moves toward the last
/// row. White moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PieceColor {
    #[display("white")]
    White,
    #[display("black")]
    Black,
}

impl PieceColor {
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    /// Row delta of a forward step for a regular piece of this color.
    #[must_use]
    pub fn forward_step(self) -> i8 {
        match self {
            PieceColor::White => -1,
            PieceColor::Black => 1,
        }
    }
}

/// Index into the board's piece table. Stays valid after capture (the piece
/// goes off-board but keeps its slot) so renderer notifications and in-flight
/// move trees can still refer to it until the turn finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
#[display("{_0}")]
pub struct PieceId(pub usize);

/// A piece on (or captured off) the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub color: PieceColor,
    /// `None` is the off-board sentinel after capture.
    pub cell: Option<CellId>,
    pub is_queen: bool,
}
