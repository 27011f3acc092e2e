//! The evolutionary tournament trainer.
//!
//! Two fixed-size populations of scoring models, one per side. A round
//! schedules every ordered (white, black) pairing as an independent task on
//! the worker pool; each task locks both members for the duration of one
//! game, plays it headless with two model players, and folds the outcome
//! into the members' scores. Mutation happens strictly between rounds, after
//! `wait_all` has observed every task complete, so no game can race a weight
//! update.
//!
//! Lock discipline: a task always acquires the white member's lock first,
//! then the black member's. Every task uses the same canonical order and the
//! two locks come from disjoint populations, so the joint acquire cannot
//! form a cycle.

use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicI64, Ordering},
};

use rand::{Rng, seq::IndexedRandom};

use shashki_engine::{Board, Controller, Game, GameOutcome, PieceColor};
use shashki_evaluator::{ModelPlayer, ScoringModel};

use crate::pool::{PoolShutdownError, TaskFailedError, WorkerPool};

/// Points for winning one game.
const WIN_SCORE: i64 = 2;
/// Points each side receives for a draw.
const DRAW_SCORE: i64 = 1;

/// One scoring model plus its tournament score and access guard.
#[derive(Debug)]
pub struct PopulationMember<M> {
    model: Mutex<M>,
    score: AtomicI64,
}

impl<M> PopulationMember<M> {
    fn new(model: M) -> Arc<Self> {
        Arc::new(Self {
            model: Mutex::new(model),
            score: AtomicI64::new(0),
        })
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        self.score.load(Ordering::SeqCst)
    }

    fn add_score(&self, delta: i64) {
        self.score.fetch_add(delta, Ordering::SeqCst);
    }

    fn reset_score(&self) {
        self.score.store(0, Ordering::SeqCst);
    }

    fn lock_model(&self) -> MutexGuard<'_, M> {
        self.model.lock().unwrap()
    }
}

/// Best model seen so far for one side, independent of the mutating
/// population.
#[derive(Debug, Clone)]
pub struct BestModel<M> {
    pub model: M,
    pub score: i64,
}

/// Scores of one finished round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub games: usize,
    pub white_scores: Vec<i64>,
    pub black_scores: Vec<i64>,
}

/// Why a round could not complete; both variants are fatal scheduling
/// errors, not game outcomes.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum TrainError {
    #[display("could not schedule game: {_0}")]
    Shutdown(PoolShutdownError),
    #[display("game task failed: {_0}")]
    Task(TaskFailedError),
}

/// Trainer parameters.
#[derive(Debug, Clone, Copy)]
pub struct TrainerConfig {
    /// Members per side.
    pub population_size: usize,
    /// Worker threads games run on.
    pub workers: usize,
    /// Members per side kept verbatim at each selection step.
    pub top_k: usize,
}

/// The tournament trainer: two populations, a worker pool and the best-ever
/// model per side.
pub struct Trainer<M> {
    white: Vec<Arc<PopulationMember<M>>>,
    black: Vec<Arc<PopulationMember<M>>>,
    pool: WorkerPool,
    top_k: usize,
    best_white: Option<BestModel<M>>,
    best_black: Option<BestModel<M>>,
}

impl<M> Trainer<M>
where
    M: ScoringModel + Clone + Send + 'static,
{
    /// Builds both populations from `make_model` and spawns the pool.
    ///
    /// # Panics
    ///
    /// Panics if the population size or `top_k` is zero, or `top_k` exceeds
    /// the population size.
    pub fn new<F>(config: TrainerConfig, mut make_model: F) -> Self
    where
        F: FnMut() -> M,
    {
        assert!(config.population_size > 0, "population cannot be empty");
        assert!(
            (1..=config.population_size).contains(&config.top_k),
            "top_k must be within the population"
        );
        let mut make_side = |count: usize| -> Vec<Arc<PopulationMember<M>>> {
            (0..count).map(|_| PopulationMember::new(make_model())).collect()
        };
        let white = make_side(config.population_size);
        let black = make_side(config.population_size);
        Self {
            white,
            black,
            pool: WorkerPool::new(config.workers),
            top_k: config.top_k,
            best_white: None,
            best_black: None,
        }
    }

    #[must_use]
    pub fn best_white(&self) -> Option<&BestModel<M>> {
        self.best_white.as_ref()
    }

    #[must_use]
    pub fn best_black(&self) -> Option<&BestModel<M>> {
        self.best_black.as_ref()
    }

    /// Plays one full round: all `white x black` ordered pairings. Returns
    /// once every game has reported; a panicking game surfaces here as a
    /// fatal [`TrainError::Task`].
    pub fn run_round(&mut self) -> Result<RoundReport, TrainError> {
        for member in self.white.iter().chain(&self.black) {
            member.reset_score();
        }

        let games = self.white.len() * self.black.len();
        log::info!("scheduling {games} self-play games");
        let mut handles = Vec::with_capacity(games);
        for white in &self.white {
            for black in &self.black {
                let white = Arc::clone(white);
                let black = Arc::clone(black);
                let handle = self
                    .pool
                    .submit(move || play_pairing(&white, &black))
                    .map_err(TrainError::Shutdown)?;
                handles.push(handle);
            }
        }

        self.pool.wait_all();
        for handle in handles {
            handle.wait().map_err(TrainError::Task)?;
        }

        Ok(RoundReport {
            games,
            white_scores: self.white.iter().map(|m| m.score()).collect(),
            black_scores: self.black.iter().map(|m| m.score()).collect(),
        })
    }

    /// Selection + mutation step, run strictly between rounds: records the
    /// round's top scorer per side into the best-ever slot, keeps the top-k
    /// members verbatim and replaces every other member with a noised copy
    /// of a random top-k member.
    pub fn evolve<R>(&mut self, rng: &mut R)
    where
        R: Rng,
    {
        Self::evolve_side(&mut self.white, &mut self.best_white, self.top_k, rng);
        Self::evolve_side(&mut self.black, &mut self.best_black, self.top_k, rng);
    }

    fn evolve_side<R>(
        members: &mut [Arc<PopulationMember<M>>],
        best: &mut Option<BestModel<M>>,
        top_k: usize,
        rng: &mut R,
    ) where
        R: Rng,
    {
        let mut order: Vec<usize> = (0..members.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(members[i].score()));
        let elites = &order[..top_k];

        // Best-ever tracking is independent of the population mutation.
        let top = &members[order[0]];
        if best.as_ref().is_none_or(|b| top.score() > b.score) {
            *best = Some(BestModel {
                model: top.lock_model().clone(),
                score: top.score(),
            });
        }

        for &index in &order[top_k..] {
            let &source = elites.choose(rng).expect("top_k is at least one");
            let mut model = members[source].lock_model().clone();
            model.apply_noise(rng);
            *members[index].lock_model() = model;
            members[index].reset_score();
        }
    }
}

/// One self-play game between two population members.
///
/// Joint lock acquire in canonical order (white, then black); both guards
/// are held for the whole game, which is exactly the exclusive access the
/// two model players need.
fn play_pairing<M>(white: &PopulationMember<M>, black: &PopulationMember<M>)
where
    M: ScoringModel,
{
    let white_model = white.lock_model();
    let black_model = black.lock_model();

    let mut game = Game::headless(Board::standard());
    let outcome = match game.start() {
        Some(outcome) => outcome,
        None => {
            let mut white_player = ModelPlayer::new(&*white_model);
            let mut black_player = ModelPlayer::new(&*black_model);
            let mut controller = Controller::new(&mut white_player, &mut black_player);
            controller
                .play_to_end(&mut game)
                .expect("model players always produce input")
        }
    };

    match outcome {
        GameOutcome::OutOfMoves { loser } => {
            log::debug!("game over: {loser} out of moves");
            match loser.opponent() {
                PieceColor::White => white.add_score(WIN_SCORE),
                PieceColor::Black => black.add_score(WIN_SCORE),
            }
        }
        GameOutcome::Draw => {
            log::debug!("game over: draw");
            white.add_score(DRAW_SCORE);
            black.add_score(DRAW_SCORE);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand_pcg::Pcg64Mcg;
    use shashki_evaluator::LinearModel;

    use super::*;

    fn zero_model() -> LinearModel {
        LinearModel::from_weights(vec![0.0; 8 * 8 * 5], 0.5, 1.0)
    }

    #[test]
    fn test_minimal_population_schedules_one_game() {
        let mut trainer = Trainer::new(
            TrainerConfig {
                population_size: 1,
                workers: 2,
                top_k: 1,
            },
            zero_model,
        );
        let report = trainer.run_round().unwrap();
        assert_eq!(report.games, 1);
        // Every finished game hands out exactly two points.
        let total: i64 = report
            .white_scores
            .iter()
            .chain(&report.black_scores)
            .sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_four_per_side_schedules_sixteen_games() {
        let mut trainer = Trainer::new(
            TrainerConfig {
                population_size: 4,
                workers: 4,
                top_k: 2,
            },
            zero_model,
        );
        let report = trainer.run_round().unwrap();
        assert_eq!(report.games, 16);
        // `wait_all` returned only after all sixteen games reported: the
        // two points per game are all accounted for.
        let total: i64 = report
            .white_scores
            .iter()
            .chain(&report.black_scores)
            .sum();
        assert_eq!(total, 32);
        assert_eq!(report.white_scores.len(), 4);
        assert_eq!(report.black_scores.len(), 4);
    }

    #[test]
    fn test_evolve_keeps_top_k_and_mutates_the_rest() {
        let mut trainer = Trainer::new(
            TrainerConfig {
                population_size: 3,
                workers: 1,
                top_k: 1,
            },
            zero_model,
        );
        // Hand the members distinct scores without playing a round.
        trainer.white[0].add_score(4);
        trainer.white[1].add_score(6);
        trainer.white[2].add_score(2);

        let mut rng = Pcg64Mcg::new(11);
        trainer.evolve(&mut rng);

        // Best-ever is the round's top scorer.
        let best = trainer.best_white().unwrap();
        assert_eq!(best.score, 6);

        // The elite keeps its exact weights; the others are noised copies of
        // it (noise rate 1.0 makes a verbatim copy vanishingly unlikely).
        let elite = trainer.white[1].lock_model().clone();
        assert!(elite.weights().iter().all(|&w| w == 0.0));
        for index in [0, 2] {
            let member = trainer.white[index].lock_model().clone();
            assert!(
                member.weights().iter().any(|&w| w != 0.0),
                "member {index} was not mutated"
            );
            assert_eq!(trainer.white[index].score(), 0);
        }
    }

    #[test]
    fn test_best_ever_survives_worse_rounds() {
        let mut trainer = Trainer::new(
            TrainerConfig {
                population_size: 2,
                workers: 1,
                top_k: 1,
            },
            zero_model,
        );
        let mut rng = Pcg64Mcg::new(3);
        trainer.white[0].add_score(8);
        trainer.evolve(&mut rng);
        assert_eq!(trainer.best_white().unwrap().score, 8);

        for member in &trainer.white {
            member.reset_score();
        }
        trainer.white[1].add_score(3);
        trainer.evolve(&mut rng);
        // The stored best outscores this round's top, so it is kept.
        assert_eq!(trainer.best_white().unwrap().score, 8);
    }
}
