//! The turn state machine.
//!
//! A turn runs `TurnStart -> AwaitPieceSelection -> AwaitDestinationSelection
//! -> apply -> {AwaitDestinationSelection (forced continuation) | TurnStart}`.
//! `TurnStart` rebuilds the move forest; everything afterwards only matches
//! clicks against precomputed nodes. Out-of-moves and the reversible-move
//! draw are ordinary values returned from the click handler, not panics:
//! they are the expected ways a game ends.

use crate::{
    core::{
        Board, CellId, Direction, MoveForest, MoveNode, PieceColor, build_move_forest,
        capture_continuations,
    },
    game::{
        player::GameView,
        render::{BoardRenderer, NullRenderer},
    },
};

/// Consecutive reversible half-moves (queen moves without capture) after
/// which the game is drawn.
pub const DRAW_THRESHOLD: u32 = 30;

/// Terminal result of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The side to move had no legal move and loses.
    OutOfMoves { loser: PieceColor },
    /// The reversible-move counter reached [`DRAW_THRESHOLD`].
    Draw,
}

/// What a single click did to the game.
///
/// Clicks with no matching transition are `Ignored` by design: stray input
/// is tolerated, not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    PieceSelected { cell: CellId },
    Moved(MoveOutcome),
}

/// Result of a committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The moved piece must keep capturing; the turn has not passed.
    ChainContinues { cell: CellId },
    /// The turn passed to the opponent, whose forest is ready.
    TurnPassed,
    GameOver(GameOutcome),
}

/// One game of draughts: board, move forest and selection state.
pub struct Game {
    board: Board,
    renderer: Box<dyn BoardRenderer + Send>,
    forest: MoveForest,
    active: PieceColor,
    selected: Option<CellId>,
    must_continue: Option<CellId>,
    /// Cells captured this chain. The pieces stay on the board (blocking,
    /// non-capturable) until the chain completes.
    pending_captured: Vec<CellId>,
    reversible_moves: u32,
}

impl Game {
    #[must_use]
    pub fn new(board: Board, renderer: Box<dyn BoardRenderer + Send>) -> Self {
        Self {
            board,
            renderer,
            forest: MoveForest::default(),
            active: PieceColor::White,
            selected: None,
            must_continue: None,
            pending_captured: Vec::new(),
            reversible_moves: 0,
        }
    }

    /// A game with no presentation attached.
    #[must_use]
    pub fn headless(board: Board) -> Self {
        Self::new(board, Box::new(NullRenderer))
    }

    /// Computes the first turn. Returns the outcome immediately if the
    /// starting side already has no legal move.
    pub fn start(&mut self) -> Option<GameOutcome> {
        self.renderer.init_board(&self.board);
        self.begin_turn()
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active(&self) -> PieceColor {
        self.active
    }

    #[must_use]
    pub fn forest(&self) -> &MoveForest {
        &self.forest
    }

    #[must_use]
    pub fn selected(&self) -> Option<CellId> {
        self.selected
    }

    #[must_use]
    pub fn must_continue(&self) -> Option<CellId> {
        self.must_continue
    }

    #[must_use]
    pub fn reversible_moves(&self) -> u32 {
        self.reversible_moves
    }

    /// Read-only snapshot handed to players.
    #[must_use]
    pub fn view(&self) -> GameView<'_> {
        GameView {
            board: &self.board,
            forest: &self.forest,
            active: self.active,
            selected: self.selected,
            must_continue: self.must_continue,
        }
    }

    /// Feeds one clicked cell into the state machine.
    pub fn handle_click(&mut self, cell: CellId) -> ClickOutcome {
        // Piece selection / re-selection; locked out while a chain is in
        // flight (the continuing piece is already selected).
        if self.must_continue.is_none() && self.forest.tree(cell).is_some() {
            if self.selected != Some(cell) {
                if let Some(prev) = self.selected
                    && let Some(prev_tree) = self.forest.tree(prev)
                {
                    self.renderer.remove_highlight(prev_tree);
                }
                self.selected = Some(cell);
                let tree = self.forest.tree(cell).expect("tree present for selection");
                self.renderer.show_moves(tree);
            }
            return ClickOutcome::PieceSelected { cell };
        }

        let Some(src) = self.selected else {
            return ClickOutcome::Ignored;
        };
        let Some(tree) = self.forest.tree(src) else {
            return ClickOutcome::Ignored;
        };
        let Some(destination) = find_destination(tree, cell) else {
            return ClickOutcome::Ignored;
        };
        ClickOutcome::Moved(self.apply_move(src, cell, destination))
    }

    /// Commits the move `src -> dest` and advances the state machine.
    fn apply_move(&mut self, src: CellId, dest: CellId, destination: Destination) -> MoveOutcome {
        let tree = self
            .forest
            .take_tree(src)
            .expect("selected piece has a tree");
        // Highlight teardown precedes every board mutation.
        self.renderer.remove_highlight(&tree);
        let dest_node = take_destination(tree, dest, destination);

        let was_queen = self
            .board
            .piece_at(src)
            .expect("selected cell holds a piece")
            .is_queen;
        let piece_id = self.board.move_piece(src, dest);
        self.renderer.set_piece_position(piece_id, dest);
        let is_jump = match destination {
            Destination::Step => false,
            Destination::Jump { enemy } => {
                self.pending_captured.push(enemy);
                true
            }
        };

        let (dest_row, _) = self.board.row_col(dest);
        let promoted = !was_queen && dest_row == self.board.promotion_row(self.active);
        if promoted {
            self.board.promote(dest);
            self.renderer.promote_to_queen(piece_id, self.active);
        }

        // Chains continue on captures only. A promotion mid-chain turns the
        // piece into a queen before the continuation check and recomputes its
        // captures: new directions may have opened.
        let continuations = if is_jump {
            if promoted {
                let banned = self
                    .board
                    .direction_between(src, dest)
                    .map(Direction::opposite);
                capture_continuations(
                    &self.board,
                    dest,
                    self.active,
                    true,
                    &self.pending_captured,
                    banned,
                )
            } else {
                dest_node.into_children()
            }
        } else {
            Vec::new()
        };

        if !continuations.is_empty() {
            let tree = MoveNode::Landing {
                cell: dest,
                next: continuations,
            };
            self.renderer.show_moves(&tree);
            self.forest = MoveForest::single(dest, tree);
            self.selected = Some(dest);
            self.must_continue = Some(dest);
            return MoveOutcome::ChainContinues { cell: dest };
        }

        self.finish_turn(was_queen)
    }

    fn finish_turn(&mut self, moved_was_queen: bool) -> MoveOutcome {
        let captured_any = !self.pending_captured.is_empty();
        for cell in std::mem::take(&mut self.pending_captured) {
            let id = self.board.remove_piece(cell);
            self.renderer.erase_piece(id);
        }
        self.selected = None;
        self.must_continue = None;

        // Only a queen moving without capturing is reversible.
        if captured_any || !moved_was_queen {
            self.reversible_moves = 0;
        } else {
            self.reversible_moves += 1;
            if self.reversible_moves >= DRAW_THRESHOLD {
                return MoveOutcome::GameOver(GameOutcome::Draw);
            }
        }

        self.active = self.active.opponent();
        match self.begin_turn() {
            Some(outcome) => MoveOutcome::GameOver(outcome),
            None => MoveOutcome::TurnPassed,
        }
    }

    fn begin_turn(&mut self) -> Option<GameOutcome> {
        self.forest = build_move_forest(&self.board, self.active);
        if self.forest.is_empty() {
            return Some(GameOutcome::OutOfMoves { loser: self.active });
        }
        let movable: Vec<CellId> = self.forest.pieces_with_moves().collect();
        self.renderer.highlight_pieces(&movable);
        None
    }
}

/// How a clicked cell maps onto the selected piece's tree.
#[derive(Debug, Clone, Copy)]
enum Destination {
    /// A direct landing child: a simple step.
    Step,
    /// A landing nested one level under a capture marker: a single jump
    /// consuming `enemy`.
    Jump { enemy: CellId },
}

fn find_destination(tree: &MoveNode, dest: CellId) -> Option<Destination> {
    for child in tree.children() {
        match child {
            MoveNode::Landing { cell, .. } if *cell == dest => return Some(Destination::Step),
            MoveNode::Capture { cell, landings } => {
                if landings.iter().any(|l| l.cell() == dest) {
                    return Some(Destination::Jump { enemy: *cell });
                }
            }
            MoveNode::Landing { .. } => {}
        }
    }
    None
}

/// Extracts the owned landing node for `dest` so its precomputed subtree can
/// be re-homed as the chain's continuation tree.
fn take_destination(tree: MoveNode, dest: CellId, destination: Destination) -> MoveNode {
    for child in tree.into_children() {
        match (&child, destination) {
            (MoveNode::Landing { cell, .. }, Destination::Step) if *cell == dest => return child,
            (MoveNode::Capture { cell, .. }, Destination::Jump { enemy }) if *cell == enemy => {
                for landing in child.into_children() {
                    if landing.cell() == dest {
                        return landing;
                    }
                }
                unreachable!("destination {dest} vanished from capture subtree");
            }
            _ => {}
        }
    }
    unreachable!("destination {dest} vanished from move tree");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::core::PieceId;

    use super::*;

    fn click(game: &mut Game, row: usize, col: usize) -> ClickOutcome {
        let cell = game.board().cell_id(row, col);
        game.handle_click(cell)
    }

    #[test]
    fn test_selection_and_simple_move() {
        let mut game = Game::headless(Board::standard());
        assert_eq!(game.start(), None);
        assert_eq!(game.active(), PieceColor::White);

        // Stray clicks change nothing.
        assert_eq!(click(&mut game, 0, 1), ClickOutcome::Ignored);
        assert_eq!(click(&mut game, 4, 1), ClickOutcome::Ignored);

        // Select, re-select, then move.
        let first = game.board().cell_id(5, 0);
        let second = game.board().cell_id(5, 2);
        assert_eq!(
            game.handle_click(first),
            ClickOutcome::PieceSelected { cell: first }
        );
        assert_eq!(
            game.handle_click(second),
            ClickOutcome::PieceSelected { cell: second }
        );
        assert_eq!(game.selected(), Some(second));
        assert_eq!(
            click(&mut game, 4, 3),
            ClickOutcome::Moved(MoveOutcome::TurnPassed)
        );
        assert_eq!(game.active(), PieceColor::Black);
        assert!(game.board().piece_at(game.board().cell_id(4, 3)).is_some());
    }

    #[test]
    fn test_single_jump_removes_victim_and_passes_turn() {
        let mut game = Game::headless(Board::from_ascii(
            "\
            _._._._.\n\
            ._._._._\n\
            _._._._.\n\
            ._._._._\n\
            _b_._._.\n\
            w_._._._\n\
            _._b_._.\n\
            ._._._._\n",
        ));
        assert_eq!(game.start(), None);
        let src = game.board().cell_id(5, 0);
        let victim = game.board().cell_id(4, 1);
        let landing = game.board().cell_id(3, 2);

        assert_eq!(
            game.handle_click(src),
            ClickOutcome::PieceSelected { cell: src }
        );
        assert_eq!(
            game.handle_click(landing),
            ClickOutcome::Moved(MoveOutcome::TurnPassed)
        );
        assert!(game.board().piece_at(victim).is_none());
        assert!(game.board().piece_at(landing).is_some());
        assert_eq!(game.active(), PieceColor::Black);
        assert_eq!(game.reversible_moves(), 0);
    }

    #[test]
    fn test_chain_restricts_to_continuing_piece() {
        // White jumps (4,3) from (5,4) landing on (3,2); a second jump over
        // (2,3) is then mandatory for the same piece.
        let mut game = Game::headless(Board::from_ascii(
            "\
            _._._._b\n\
            ._._._._\n\
            _._b_._.\n\
            ._._._._\n\
            _._b_._.\n\
            ._._w_w_\n\
            _._._._.\n\
            ._._._._\n",
        ));
        assert_eq!(game.start(), None);
        let src = game.board().cell_id(5, 4);
        let mid = game.board().cell_id(3, 2);
        let end = game.board().cell_id(1, 4);

        assert_eq!(
            game.handle_click(src),
            ClickOutcome::PieceSelected { cell: src }
        );
        assert_eq!(
            game.handle_click(mid),
            ClickOutcome::Moved(MoveOutcome::ChainContinues { cell: mid })
        );
        assert_eq!(game.must_continue(), Some(mid));
        // Victim of the first jump is still on the board mid-chain.
        assert!(game.board().piece_at(game.board().cell_id(4, 3)).is_some());
        // Selecting another white piece mid-chain is ignored.
        assert_eq!(click(&mut game, 5, 6), ClickOutcome::Ignored);
        assert_eq!(
            game.handle_click(end),
            ClickOutcome::Moved(MoveOutcome::TurnPassed)
        );
        // Both victims are gone once the chain completes.
        assert!(game.board().piece_at(game.board().cell_id(4, 3)).is_none());
        assert!(game.board().piece_at(game.board().cell_id(2, 3)).is_none());
        assert_eq!(game.must_continue(), None);
    }

    #[test]
    fn test_promotion_mid_chain_recomputes_captures() {
        // The white man jumps (1,2) onto the promotion rank at (0,3); the
        // piece turns into a queen before the continuation check, and the
        // recomputed chain over the man at (1,4) offers flying landings a
        // regular piece would not have. Capturing both leaves black out of
        // pieces, so the game ends there.
        let mut game = Game::headless(Board::from_ascii(
            "\
            _._._._.\n\
            ._b_b_._\n\
            _w_._._.\n\
            ._._._._\n\
            _._._._.\n\
            ._._._._\n\
            _._._._.\n\
            ._._._._\n",
        ));
        assert_eq!(game.start(), None);
        let src = game.board().cell_id(2, 1);
        let promo = game.board().cell_id(0, 3);

        assert_eq!(
            game.handle_click(src),
            ClickOutcome::PieceSelected { cell: src }
        );
        assert_eq!(
            game.handle_click(promo),
            ClickOutcome::Moved(MoveOutcome::ChainContinues { cell: promo })
        );
        // `is_queen` flipped before the continuation check.
        assert!(game.board().piece_at(promo).unwrap().is_queen);

        // The queen may land anywhere on the open run past the second victim;
        // (4,7) is reachable only because the recompute ran with queen range.
        let end = game.board().cell_id(4, 7);
        assert_eq!(
            game.handle_click(end),
            ClickOutcome::Moved(MoveOutcome::GameOver(GameOutcome::OutOfMoves {
                loser: PieceColor::Black
            }))
        );
    }

    #[test]
    fn test_reversible_move_counter_and_draw() {
        let mut game = Game::headless(Board::from_ascii(
            "\
            _B_._._.\n\
            ._._._._\n\
            _._._._b\n\
            ._._._._\n\
            _._._._.\n\
            w_._._._\n\
            _W_._._.\n\
            ._._._._\n",
        ));
        assert_eq!(game.start(), None);

        // 30 consecutive queen shuffles with no capture end in a draw; every
        // half-move before the last one just passes the turn.
        for half_move in 0..DRAW_THRESHOLD {
            let (from, to) = match (game.active(), half_move % 4 < 2) {
                (PieceColor::White, true) => ((6, 1), (7, 0)),
                (PieceColor::White, false) => ((7, 0), (6, 1)),
                (PieceColor::Black, true) => ((0, 1), (1, 0)),
                (PieceColor::Black, false) => ((1, 0), (0, 1)),
            };
            assert!(matches!(
                click(&mut game, from.0, from.1),
                ClickOutcome::PieceSelected { .. }
            ));
            let outcome = click(&mut game, to.0, to.1);
            if half_move + 1 < DRAW_THRESHOLD {
                assert_eq!(outcome, ClickOutcome::Moved(MoveOutcome::TurnPassed));
                assert_eq!(game.reversible_moves(), half_move + 1);
            } else {
                assert_eq!(
                    outcome,
                    ClickOutcome::Moved(MoveOutcome::GameOver(GameOutcome::Draw))
                );
            }
        }
    }

    #[test]
    fn test_man_move_resets_reversible_counter() {
        let mut game = Game::headless(Board::from_ascii(
            "\
            _B_._._.\n\
            ._._._._\n\
            _._._._b\n\
            ._._._._\n\
            _._._._.\n\
            w_._._._\n\
            _W_._._.\n\
            ._._._._\n",
        ));
        assert_eq!(game.start(), None);
        // Two queen half-moves, then a white man step.
        assert!(matches!(click(&mut game, 6, 1), ClickOutcome::PieceSelected { .. }));
        assert_eq!(click(&mut game, 7, 0), ClickOutcome::Moved(MoveOutcome::TurnPassed));
        assert!(matches!(click(&mut game, 0, 1), ClickOutcome::PieceSelected { .. }));
        assert_eq!(click(&mut game, 1, 0), ClickOutcome::Moved(MoveOutcome::TurnPassed));
        assert_eq!(game.reversible_moves(), 2);
        assert!(matches!(click(&mut game, 5, 0), ClickOutcome::PieceSelected { .. }));
        assert_eq!(click(&mut game, 4, 1), ClickOutcome::Moved(MoveOutcome::TurnPassed));
        assert_eq!(game.reversible_moves(), 0);
    }

    /// Records renderer calls to check the notification ordering contract.
    struct RecordingRenderer {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl BoardRenderer for RecordingRenderer {
        fn init_board(&mut self, _board: &Board) {
            self.events.lock().unwrap().push("init".into());
        }
        fn show_moves(&mut self, tree: &MoveNode) {
            self.events
                .lock()
                .unwrap()
                .push(format!("show:{}", tree.cell()));
        }
        fn remove_highlight(&mut self, tree: &MoveNode) {
            self.events
                .lock()
                .unwrap()
                .push(format!("unshow:{}", tree.cell()));
        }
        fn highlight_pieces(&mut self, cells: &[CellId]) {
            self.events
                .lock()
                .unwrap()
                .push(format!("pieces:{}", cells.len()));
        }
        fn set_piece_position(&mut self, piece: PieceId, cell: CellId) {
            self.events
                .lock()
                .unwrap()
                .push(format!("pos:{piece}@{cell}"));
        }
        fn erase_piece(&mut self, piece: PieceId) {
            self.events.lock().unwrap().push(format!("erase:{piece}"));
        }
        fn promote_to_queen(&mut self, piece: PieceId, _color: PieceColor) {
            self.events.lock().unwrap().push(format!("promote:{piece}"));
        }
    }

    #[test]
    fn test_renderer_ordering_on_jump() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let board = Board::from_ascii(
            "\
            _._._._.\n\
            ._._._._\n\
            _._._._.\n\
            ._._._._\n\
            _b_._._.\n\
            w_._._._\n\
            _._b_._.\n\
            ._._._._\n",
        );
        let mut game = Game::new(
            board,
            Box::new(RecordingRenderer {
                events: Arc::clone(&events),
            }),
        );
        assert_eq!(game.start(), None);
        let src = game.board().cell_id(5, 0);
        let landing = game.board().cell_id(3, 2);
        game.handle_click(src);
        game.handle_click(landing);

        let events = events.lock().unwrap();
        let pos = |needle: &str| {
            events
                .iter()
                .position(|e| e.starts_with(needle))
                .unwrap_or_else(|| panic!("missing event {needle}: {events:?}"))
        };
        // Highlight teardown strictly before the position update, erase only
        // at chain end, and the next turn's piece highlight last.
        assert!(pos("unshow:") < pos("pos:"));
        assert!(pos("pos:") < pos("erase:"));
        assert_eq!(events.first().map(String::as_str), Some("init"));
    }
}
