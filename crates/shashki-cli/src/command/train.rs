use std::path::PathBuf;

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use shashki_engine::Board;
use shashki_evaluator::{LinearModel, feature_width};
use shashki_training::{Trainer, TrainerConfig};

use crate::{
    schema::{TrainedModel, TrainedModelPair},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Scoring models per side
    #[arg(long, default_value_t = 8)]
    population: usize,
    /// Tournament rounds to play
    #[arg(long, default_value_t = 20)]
    rounds: usize,
    /// Worker threads games run on
    #[arg(long, default_value_t = 4)]
    workers: usize,
    /// Members per side kept verbatim at each selection step
    #[arg(long, default_value_t = 2)]
    top_k: usize,
    /// Standard deviation of mutation noise
    #[arg(long, default_value_t = 0.1)]
    noise_sigma: f32,
    /// Per-weight mutation probability
    #[arg(long, default_value_t = 0.3)]
    noise_rate: f32,
    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the trained model document
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.rounds > 0, "at least one round is required");
    let mut rng = match arg.seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed),
        None => Pcg64Mcg::from_rng(&mut rand::rng()),
    };
    let width = feature_width(&Board::standard());

    let mut trainer = Trainer::new(
        TrainerConfig {
            population_size: arg.population,
            workers: arg.workers,
            top_k: arg.top_k,
        },
        || {
            let mut model = LinearModel::random(&mut rng, width);
            model.set_noise(arg.noise_sigma, arg.noise_rate);
            model
        },
    );

    for round in 0..arg.rounds {
        let report = trainer.run_round()?;
        eprintln!("Round #{round} ({} games):", report.games);
        eprintln!("  White scores: {:?}", report.white_scores);
        eprintln!("  Black scores: {:?}", report.black_scores);
        trainer.evolve(&mut rng);
    }

    let best_white = trainer.best_white().expect("at least one round ran");
    let best_black = trainer.best_black().expect("at least one round ran");
    eprintln!("Training completed.");
    eprintln!("  Best white score: {}", best_white.score);
    eprintln!("  Best black score: {}", best_black.score);

    let document = TrainedModelPair {
        name: "self-play-linear".to_owned(),
        trained_at: Utc::now(),
        rounds: arg.rounds,
        white: TrainedModel {
            best_score: best_white.score,
            weights: best_white.model.weights().to_vec(),
        },
        black: TrainedModel {
            best_score: best_black.score,
            weights: best_black.model.weights().to_vec(),
        },
    };
    Output::save_json(&document, arg.output.clone())?;
    if let Some(path) = &arg.output {
        eprintln!("Model saved to {}", path.display());
    }

    Ok(())
}
