use std::{fs, path::PathBuf};

use anyhow::Context;

use shashki_engine::{
    Board, Controller, Game, GameOutcome, PieceColor, ReplayLog, ScriptedPlayer,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Replay log: one `<side> <cell>` pair per line in turn order
    log: PathBuf,
    /// ASCII board file for the starting position (standard layout if absent)
    #[arg(long)]
    board: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let text = fs::read_to_string(&arg.log)
        .with_context(|| format!("Failed to read replay log: {}", arg.log.display()))?;
    let log: ReplayLog = text
        .parse()
        .with_context(|| format!("Failed to parse replay log: {}", arg.log.display()))?;

    let board = match &arg.board {
        Some(path) => {
            let art = fs::read_to_string(path)
                .with_context(|| format!("Failed to read board file: {}", path.display()))?;
            Board::from_ascii(&art)
        }
        None => Board::standard(),
    };

    let mut white = ScriptedPlayer::from_log(&log, PieceColor::White);
    let mut black = ScriptedPlayer::from_log(&log, PieceColor::Black);
    let mut game = Game::headless(board);

    let outcome = match game.start() {
        Some(outcome) => Some(outcome),
        None => {
            let mut controller = Controller::new(&mut white, &mut black);
            controller.play_to_end(&mut game)
        }
    };

    println!("{}", game.board());
    match outcome {
        Some(GameOutcome::OutOfMoves { loser }) => {
            println!("{} is out of moves; {} wins", loser, loser.opponent());
        }
        Some(GameOutcome::Draw) => println!("draw by repetition of reversible moves"),
        None => println!("replay exhausted with the game still running"),
    }
    Ok(())
}
