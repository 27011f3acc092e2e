use crate::{
    core::{CellId, PieceColor},
    game::{
        player::Player,
        turn::{ClickOutcome, Game, GameOutcome, MoveOutcome},
    },
};

/// Glue between the two players and the turn state machine: asks the active
/// side's player for a cell and feeds it to the click handler.
pub struct Controller<'a> {
    white: &'a mut dyn Player,
    black: &'a mut dyn Player,
}

impl<'a> Controller<'a> {
    pub fn new(white: &'a mut dyn Player, black: &'a mut dyn Player) -> Self {
        Self { white, black }
    }

    /// Runs one tick: polls the active player and delivers its click.
    /// Returns `None` when the player had no input available (a no-op).
    pub fn next_move(&mut self, game: &mut Game) -> Option<ClickOutcome> {
        let cell: CellId = {
            let view = game.view();
            let player = match view.active {
                PieceColor::White => &mut *self.white,
                PieceColor::Black => &mut *self.black,
            };
            player.turn(&view)?
        };
        Some(game.handle_click(cell))
    }

    /// Drives a started game until it ends, or until the active player runs
    /// out of input (`None`). Suitable for scripted and model players; an
    /// interactive game instead calls [`Controller::next_move`] per tick.
    pub fn play_to_end(&mut self, game: &mut Game) -> Option<GameOutcome> {
        loop {
            match self.next_move(game)? {
                ClickOutcome::Moved(MoveOutcome::GameOver(outcome)) => return Some(outcome),
                _ => continue,
            }
        }
    }
}
