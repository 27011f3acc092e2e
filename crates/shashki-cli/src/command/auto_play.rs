use std::path::PathBuf;

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use shashki_engine::{Board, Controller, Game, GameOutcome};
use shashki_evaluator::{LinearModel, ModelPlayer, feature_width};

use crate::schema::TrainedModelPair;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Trained model document; fresh random models when absent
    #[arg(long)]
    model: Option<PathBuf>,
    /// RNG seed for the random models
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let board = Board::standard();
    let (white_model, black_model) = match &arg.model {
        Some(path) => {
            let document = TrainedModelPair::open(path)?;
            (
                document.white.to_model(0.0, 0.0),
                document.black.to_model(0.0, 0.0),
            )
        }
        None => {
            let mut rng = match arg.seed {
                Some(seed) => Pcg64Mcg::seed_from_u64(seed),
                None => Pcg64Mcg::from_rng(&mut rand::rng()),
            };
            let width = feature_width(&board);
            (
                LinearModel::random(&mut rng, width),
                LinearModel::random(&mut rng, width),
            )
        }
    };

    let mut white = ModelPlayer::new(&white_model);
    let mut black = ModelPlayer::new(&black_model);
    let mut game = Game::headless(board);
    let outcome = match game.start() {
        Some(outcome) => outcome,
        None => {
            let mut controller = Controller::new(&mut white, &mut black);
            controller
                .play_to_end(&mut game)
                .expect("model players always produce input")
        }
    };

    println!("{}", game.board());
    match outcome {
        GameOutcome::OutOfMoves { loser } => {
            let winner = loser.opponent();
            println!("{loser} is out of moves; {winner} wins");
        }
        GameOutcome::Draw => println!("draw by repetition of reversible moves"),
    }
    Ok(())
}
