use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shashki_evaluator::LinearModel;

use crate::util::read_json_file;

/// One side's trained model in the persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub best_score: i64,
    pub weights: Vec<f32>,
}

impl TrainedModel {
    pub fn to_model(&self, noise_sigma: f32, noise_rate: f32) -> LinearModel {
        LinearModel::from_weights(self.weights.clone(), noise_sigma, noise_rate)
    }
}

/// The JSON document the `train` command writes: the best-ever model for
/// each side plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModelPair {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub rounds: usize,
    pub white: TrainedModel,
    pub black: TrainedModel,
}

impl TrainedModelPair {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        read_json_file("trained model", path)
    }
}
