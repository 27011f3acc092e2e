//! The scoring-model boundary.
//!
//! The engine and trainer treat a model as four capabilities: score a
//! feature vector, reshape inputs to its expected width, perturb its weights
//! in place, and clone itself. Nothing outside this module inspects model
//! internals.

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::encoding::adjust_width;

/// An opaque move-scoring model.
pub trait ScoringModel: Send {
    /// Input width the model expects.
    fn input_width(&self) -> usize;

    /// Scores an already-adjusted feature vector; higher is better for the
    /// side the features were encoded for.
    fn forward(&self, features: &[f32]) -> f32;

    /// Pads or truncates a raw feature vector to the model's input width.
    fn adjust_shape(&self, features: Vec<f32>) -> Vec<f32> {
        adjust_width(features, self.input_width())
    }

    /// In-place random perturbation of the weights; the trainer's mutation
    /// primitive.
    fn apply_noise(&mut self, rng: &mut dyn RngCore);

    fn clone_model(&self) -> Box<dyn ScoringModel>;
}

/// Default perturbation strength for [`LinearModel::random`].
pub const DEFAULT_NOISE_SIGMA: f32 = 0.1;
/// Default per-weight perturbation probability for [`LinearModel::random`].
pub const DEFAULT_NOISE_RATE: f32 = 0.3;

/// A linear scorer: dot product of a weight vector with the feature vector.
///
/// Weights start uniform in `[-0.5, 0.5]`; `apply_noise` adds Gaussian noise
/// per weight with the stored probability. Weights are not clamped: scoring
/// weights carry sign, unlike ranking weights normalized to a simplex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f32>,
    noise_sigma: f32,
    noise_rate: f32,
}

impl LinearModel {
    #[must_use]
    pub fn random<R>(rng: &mut R, input_width: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights = (0..input_width)
            .map(|_| rng.random_range(-0.5..=0.5))
            .collect();
        Self {
            weights,
            noise_sigma: DEFAULT_NOISE_SIGMA,
            noise_rate: DEFAULT_NOISE_RATE,
        }
    }

    #[must_use]
    pub fn from_weights(weights: Vec<f32>, noise_sigma: f32, noise_rate: f32) -> Self {
        Self {
            weights,
            noise_sigma,
            noise_rate,
        }
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn set_noise(&mut self, sigma: f32, rate: f32) {
        self.noise_sigma = sigma;
        self.noise_rate = rate;
    }
}

impl ScoringModel for LinearModel {
    fn input_width(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, features: &[f32]) -> f32 {
        self.weights
            .iter()
            .zip(features)
            .map(|(w, f)| w * f)
            .sum()
    }

    fn apply_noise(&mut self, rng: &mut dyn RngCore) {
        let normal = Normal::new(0.0, self.noise_sigma).expect("sigma is finite and non-negative");
        for w in &mut self.weights {
            if rng.random_bool(f64::from(self.noise_rate)) {
                *w += normal.sample(rng);
            }
        }
    }

    fn clone_model(&self) -> Box<dyn ScoringModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_forward_is_a_dot_product() {
        let model = LinearModel::from_weights(vec![1.0, -2.0, 0.5], 0.1, 0.3);
        assert_eq!(model.forward(&[1.0, 1.0, 2.0]), 0.0);
        assert_eq!(model.forward(&[0.0, 1.0, 0.0]), -2.0);
    }

    #[test]
    fn test_adjust_shape_matches_input_width() {
        let model = LinearModel::from_weights(vec![0.0; 4], 0.1, 0.3);
        assert_eq!(model.adjust_shape(vec![1.0; 7]).len(), 4);
        assert_eq!(model.adjust_shape(vec![1.0; 2]), [1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_apply_noise_perturbs_some_weights() {
        let mut rng = Pcg64Mcg::new(42);
        let mut model = LinearModel::from_weights(vec![0.0; 64], 1.0, 1.0);
        model.apply_noise(&mut rng);
        assert!(model.weights().iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_clone_model_is_independent() {
        let mut rng = Pcg64Mcg::new(7);
        let original = LinearModel::random(&mut rng, 8);
        let mut cloned = original.clone_model();
        cloned.apply_noise(&mut rng);
        // The original's weights are untouched by noising the clone.
        let reference = LinearModel::random(&mut Pcg64Mcg::new(7), 8);
        assert_eq!(original.weights(), reference.weights());
    }
}
