use crate::core::{Board, CellId, MoveNode, PieceColor, PieceId};

/// Presentation boundary of the engine.
///
/// The engine drives a renderer as a side effect of state transitions and
/// never reads anything back. Ordering guarantees: `remove_highlight` for a
/// move tree is issued before the corresponding move mutates the board, and
/// `set_piece_position` is issued after the board model is already updated.
pub trait BoardRenderer {
    /// The board has been (re)created with this layout.
    fn init_board(&mut self, board: &Board);
    /// Display the legal destinations of a selected piece's move tree.
    fn show_moves(&mut self, tree: &MoveNode);
    /// Take down highlights previously shown for `tree`.
    fn remove_highlight(&mut self, tree: &MoveNode);
    /// Mark the pieces the mover may select this turn.
    fn highlight_pieces(&mut self, cells: &[CellId]);
    /// A piece arrived on `cell`.
    fn set_piece_position(&mut self, piece: PieceId, cell: CellId);
    /// A captured piece left the board.
    fn erase_piece(&mut self, piece: PieceId);
    /// A piece was promoted to queen.
    fn promote_to_queen(&mut self, piece: PieceId, color: PieceColor);
}

/// Renderer for headless games (self-play, tests): ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl BoardRenderer for NullRenderer {
    fn init_board(&mut self, _board: &Board) {}
    fn show_moves(&mut self, _tree: &MoveNode) {}
    fn remove_highlight(&mut self, _tree: &MoveNode) {}
    fn highlight_pieces(&mut self, _cells: &[CellId]) {}
    fn set_piece_position(&mut self, _piece: PieceId, _cell: CellId) {}
    fn erase_piece(&mut self, _piece: PieceId) {}
    fn promote_to_queen(&mut self, _piece: PieceId, _color: PieceColor) {}
}
