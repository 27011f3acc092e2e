use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::{
    core::{Board, CellId, MoveForest, MoveNode, PieceColor},
    game::replay::ReplayLog,
};

/// Read-only snapshot of a game handed to players each tick.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub board: &'a Board,
    pub forest: &'a MoveForest,
    pub active: PieceColor,
    pub selected: Option<CellId>,
    pub must_continue: Option<CellId>,
}

/// A move source for one side.
///
/// `turn` produces the next cell to click, or `None` when no input is
/// available this tick. `None` is a no-op for the controller, not an error;
/// interactive and time-sliced players rely on it.
pub trait Player {
    fn turn(&mut self, view: &GameView<'_>) -> Option<CellId>;
}

/// Shared handle feeding cells into a [`QueuedInputPlayer`].
///
/// This is the human input surface: whatever owns the event loop pushes the
/// clicked cell id, the player drains one per tick.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    cells: Arc<Mutex<VecDeque<CellId>>>,
}

impl InputQueue {
    pub fn push(&self, cell: CellId) {
        self.cells.lock().unwrap().push_back(cell);
    }

    fn pop(&self) -> Option<CellId> {
        self.cells.lock().unwrap().pop_front()
    }
}

/// Human player: replays clicks from a shared input queue, one per tick.
#[derive(Debug, Default)]
pub struct QueuedInputPlayer {
    queue: InputQueue,
}

impl QueuedInputPlayer {
    #[must_use]
    pub fn new() -> (Self, InputQueue) {
        let queue = InputQueue::default();
        (
            Self {
                queue: queue.clone(),
            },
            queue,
        )
    }
}

impl Player for QueuedInputPlayer {
    fn turn(&mut self, _view: &GameView<'_>) -> Option<CellId> {
        self.queue.pop()
    }
}

/// Replays a fixed sequence of cells; yields `None` once exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    cells: VecDeque<CellId>,
}

impl ScriptedPlayer {
    #[must_use]
    pub fn new<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = CellId>,
    {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// One side's clicks out of a two-sided replay log.
    #[must_use]
    pub fn from_log(log: &ReplayLog, side: PieceColor) -> Self {
        Self::new(log.cells_for(side))
    }
}

impl Player for ScriptedPlayer {
    fn turn(&mut self, _view: &GameView<'_>) -> Option<CellId> {
        self.cells.pop_front()
    }
}

/// Baseline player: deterministically alternates between selecting the first
/// piece that has moves and clicking that piece's first destination. Exists
/// for liveness (smoke tests, filler opponents), not strength.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPlayer {
    pick_destination: bool,
}

impl Player for HeuristicPlayer {
    fn turn(&mut self, view: &GameView<'_>) -> Option<CellId> {
        let pick_destination = self.pick_destination;
        self.pick_destination = !pick_destination;
        if pick_destination {
            let selected = view.selected?;
            let tree = view.forest.tree(selected)?;
            let first = tree.children().first()?;
            match first {
                MoveNode::Landing { cell, .. } => Some(*cell),
                MoveNode::Capture { landings, .. } => landings.first().map(MoveNode::cell),
            }
        } else {
            view.must_continue
                .or_else(|| view.forest.pieces_with_moves().next())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::turn::{ClickOutcome, Game, MoveOutcome};

    #[test]
    fn test_queued_input_player_drains_one_cell_per_tick() {
        let (mut player, queue) = QueuedInputPlayer::new();
        let game = Game::headless(Board::standard());
        let view = game.view();
        assert_eq!(player.turn(&view), None);
        queue.push(CellId(40));
        queue.push(CellId(33));
        assert_eq!(player.turn(&view), Some(CellId(40)));
        assert_eq!(player.turn(&view), Some(CellId(33)));
        assert_eq!(player.turn(&view), None);
    }

    #[test]
    fn test_heuristic_player_completes_a_move() {
        let mut game = Game::headless(Board::standard());
        assert_eq!(game.start(), None);
        let mut player = HeuristicPlayer::default();

        let select = player.turn(&game.view()).unwrap();
        assert!(matches!(
            game.handle_click(select),
            ClickOutcome::PieceSelected { .. }
        ));
        let dest = player.turn(&game.view()).unwrap();
        assert_eq!(
            game.handle_click(dest),
            ClickOutcome::Moved(MoveOutcome::TurnPassed)
        );
    }
}
